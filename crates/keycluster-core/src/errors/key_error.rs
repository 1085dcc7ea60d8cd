//! Key function errors.

use super::error_code::{self, KeyclusterErrorCode};

/// Failure raised by a key function for a single value.
///
/// `transient` marks failures caused by the environment rather than the
/// value itself; only those are eligible for retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct KeyFnError {
    pub message: String,
    pub transient: bool,
}

impl KeyFnError {
    /// A permanent failure. Retrying the same value yields the same error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }

    /// A failure that may succeed if the key is computed again.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

impl KeyclusterErrorCode for KeyFnError {
    fn error_code(&self) -> &'static str {
        error_code::KEY_FN_ERROR
    }
}
