//! Error handling for keycluster.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod cluster_error;
pub mod concurrency_error;
pub mod config_error;
pub mod error_code;
pub mod key_error;

pub use cluster_error::ClusterError;
pub use concurrency_error::ConcurrencyError;
pub use config_error::ConfigError;
pub use error_code::KeyclusterErrorCode;
pub use key_error::KeyFnError;
