//! Worker pool errors.

use super::error_code::{self, KeyclusterErrorCode};

/// Errors raised by the worker pool rather than by the key function.
#[derive(Debug, thiserror::Error)]
pub enum ConcurrencyError {
    #[error("Worker pool with {threads} threads failed to start: {message}")]
    PoolBuild { threads: usize, message: String },

    #[error("Worker panicked: {message}")]
    WorkerPanicked { message: String },
}

impl KeyclusterErrorCode for ConcurrencyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PoolBuild { .. } => error_code::CONCURRENCY_ERROR,
            Self::WorkerPanicked { .. } => error_code::WORKER_PANICKED,
        }
    }
}
