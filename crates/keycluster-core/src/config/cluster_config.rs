//! Clustering configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_CHUNK_SIZE: usize = 256;
pub const DEFAULT_BATCH_SIZE: usize = 65_536;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_MIN_PARALLEL_VALUES: usize = 1024;
pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

/// Configuration for the clustering engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClusterConfig {
    /// Worker threads used for key computation. Default: 1.
    pub concurrency: Option<usize>,
    /// Values handed to a worker per task. Default: 256.
    pub chunk_size: Option<usize>,
    /// Values buffered per batch when clustering a stream. Default: 65536.
    pub batch_size: Option<usize>,
    /// Attempts per value for transient key failures. Default: 1 (no retry).
    pub max_attempts: Option<u32>,
    /// Below this many distinct values the sequential path is used. Default: 1024.
    pub min_parallel_values: Option<usize>,
    /// Entries kept by cached key functions. Default: 100000.
    pub cache_capacity: Option<u64>,
}

impl ClusterConfig {
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn effective_min_parallel_values(&self) -> usize {
        self.min_parallel_values.unwrap_or(DEFAULT_MIN_PARALLEL_VALUES)
    }

    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }
}
