//! Key functions: the strategy that decides which values collide.

pub mod cached;
pub mod fingerprint;
pub mod key_fn;
pub mod ngram;

pub use cached::CachedKeyFn;
pub use fingerprint::Fingerprint;
pub use key_fn::{infallible, key_fn, FnKey, InfallibleKey, KeyFn};
pub use ngram::NGramFingerprint;
