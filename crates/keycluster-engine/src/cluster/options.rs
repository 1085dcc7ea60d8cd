//! Clusterer options, resolved from `ClusterConfig` or built directly.

use keycluster_core::config::cluster_config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MIN_PARALLEL_VALUES,
};
use keycluster_core::config::ClusterConfig;
use keycluster_core::errors::{ClusterError, ConfigError};

/// How often a transient key failure is attempted before it aborts the call.
/// Permanent failures are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy { max_attempts: 1 };

    pub fn attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Worker threads for key computation.
    pub concurrency: usize,
    /// Distinct values per worker task.
    pub chunk_size: usize,
    /// Values buffered per batch by `cluster_stream`.
    pub batch_size: usize,
    /// Inputs with fewer distinct values stay on the calling thread.
    pub min_parallel_values: usize,
    pub retry: RetryPolicy,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            min_parallel_values: DEFAULT_MIN_PARALLEL_VALUES,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClusterOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_min_parallel_values(mut self, min_parallel_values: usize) -> Self {
        self.min_parallel_values = min_parallel_values;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self {
            concurrency: config.effective_concurrency(),
            chunk_size: config.effective_chunk_size(),
            batch_size: config.effective_batch_size(),
            min_parallel_values: config.effective_min_parallel_values(),
            retry: RetryPolicy::attempts(config.effective_max_attempts()),
        }
    }

    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.concurrency == 0 {
            return Err(ClusterError::InvalidConcurrency(0));
        }
        let positive = [
            ("cluster.chunk_size", self.chunk_size),
            ("cluster.batch_size", self.batch_size),
            ("cluster.max_attempts", self.retry.max_attempts as usize),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
