//! Clustering errors.
//! Aggregates subsystem errors via `From` conversions.

use super::error_code::{self, KeyclusterErrorCode};
use super::{ConcurrencyError, ConfigError, KeyFnError};

/// Errors that abort a clustering call. A call that returns one of these
/// produced no result mapping.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Key computation failed for value {value}: {source}")]
    KeyComputation {
        /// `Debug` rendering of the offending value.
        value: String,
        source: KeyFnError,
    },

    #[error("Concurrency error: {0}")]
    Concurrency(#[from] ConcurrencyError),

    #[error("Clustering cancelled")]
    Cancelled,

    #[error("Concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClusterError {
    /// Build a key computation error for `value`.
    pub fn key_computation<V: std::fmt::Debug + ?Sized>(value: &V, source: KeyFnError) -> Self {
        Self::KeyComputation {
            value: format!("{value:?}"),
            source,
        }
    }
}

impl KeyclusterErrorCode for ClusterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::KeyComputation { .. } => error_code::KEY_COMPUTATION_ERROR,
            Self::Concurrency(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
            Self::InvalidConcurrency(_) => error_code::INVALID_CONCURRENCY,
            Self::Config(e) => e.error_code(),
        }
    }
}
