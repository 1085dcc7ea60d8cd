//! KeyclusterErrorCode trait for stable, machine-readable error codes.

/// Trait for mapping keycluster errors to stable error code strings.
/// Every error enum implements this so callers can branch on a code
/// without matching on message text.
pub trait KeyclusterErrorCode {
    /// Returns the error code string (e.g., "KEY_COMPUTATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const KEY_COMPUTATION_ERROR: &str = "KEY_COMPUTATION_ERROR";
pub const KEY_FN_ERROR: &str = "KEY_FN_ERROR";
pub const CONCURRENCY_ERROR: &str = "CONCURRENCY_ERROR";
pub const WORKER_PANICKED: &str = "WORKER_PANICKED";
pub const CANCELLED: &str = "CANCELLED";
pub const INVALID_CONCURRENCY: &str = "INVALID_CONCURRENCY";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
