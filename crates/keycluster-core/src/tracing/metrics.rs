//! Structured span field names shared across keycluster crates.
//!
//! Using the same names everywhere keeps log queries stable.

/// Values supplied by the caller, duplicates included.
pub const INPUT_VALUES: &str = "input_values";

/// Distinct values after deduplication.
pub const DISTINCT_VALUES: &str = "distinct_values";

/// Clusters in the final result.
pub const CLUSTERS: &str = "clusters";

/// Worker threads used for key computation.
pub const WORKERS: &str = "workers";

/// Key computation phase duration in milliseconds.
pub const KEY_MS: &str = "key_ms";

/// Merge phase duration in milliseconds.
pub const MERGE_MS: &str = "merge_ms";

/// Distinct values keyed per second.
pub const VALUES_PER_SECOND: &str = "values_per_second";

/// Batches consumed from a streamed input.
pub const BATCHES: &str = "batches";
