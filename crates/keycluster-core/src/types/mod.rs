//! Collection aliases used across keycluster.

pub mod collections;

pub use collections::{FxHashMap, FxHashSet};
