//! # keycluster-engine
//!
//! Key-collision clustering: values that map to the same key under a pure
//! key function end up in the same cluster. Key computation may run on a
//! worker pool; grouping is always a single sequential merge.

pub mod cluster;
pub mod keys;

pub use cluster::{cluster, ClusterOptions, ClusterStats, Clusterer, Clustering, RetryPolicy};
pub use keys::{infallible, key_fn, CachedKeyFn, Fingerprint, KeyFn, NGramFingerprint};
