//! # keycluster-core
//!
//! Shared foundation for the keycluster workspace: errors, configuration,
//! tracing setup, cooperative cancellation, events, and collection aliases.

pub mod config;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;

pub use config::KeyclusterConfig;
pub use errors::{ClusterError, ConcurrencyError, ConfigError, KeyFnError};
pub use traits::{Cancellable, CancellationToken};
