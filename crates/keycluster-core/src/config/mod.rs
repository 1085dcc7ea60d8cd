//! Configuration system for keycluster.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod cluster_config;
pub mod keycluster_config;
pub mod logging_config;

pub use cluster_config::ClusterConfig;
pub use keycluster_config::{CliOverrides, KeyclusterConfig};
pub use logging_config::LoggingConfig;
