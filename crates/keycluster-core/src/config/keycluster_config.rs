//! Top-level keycluster configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ClusterConfig, LoggingConfig};
use crate::errors::ConfigError;

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "keycluster.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`KEYCLUSTER_*`)
/// 3. Project config (`keycluster.toml` in project root)
/// 4. User config (`~/.keycluster/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeyclusterConfig {
    pub cluster: ClusterConfig,
    pub logging: LoggingConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub concurrency: Option<usize>,
    pub chunk_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_attempts: Option<u32>,
    pub log_level: Option<String>,
}

impl KeyclusterConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(path = %user_config_path.display(), error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &KeyclusterConfig) -> Result<(), ConfigError> {
        let positive = [
            ("cluster.concurrency", config.cluster.concurrency),
            ("cluster.chunk_size", config.cluster.chunk_size),
            ("cluster.batch_size", config.cluster.batch_size),
        ];
        for (field, value) in positive {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if config.cluster.max_attempts == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "cluster.max_attempts".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.cluster.cache_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "cluster.cache_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.keycluster/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut KeyclusterConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: KeyclusterConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `Some` values in `other` win.
    fn merge(base: &mut KeyclusterConfig, other: &KeyclusterConfig) {
        let (b, o) = (&mut base.cluster, &other.cluster);
        if o.concurrency.is_some() {
            b.concurrency = o.concurrency;
        }
        if o.chunk_size.is_some() {
            b.chunk_size = o.chunk_size;
        }
        if o.batch_size.is_some() {
            b.batch_size = o.batch_size;
        }
        if o.max_attempts.is_some() {
            b.max_attempts = o.max_attempts;
        }
        if o.min_parallel_values.is_some() {
            b.min_parallel_values = o.min_parallel_values;
        }
        if o.cache_capacity.is_some() {
            b.cache_capacity = o.cache_capacity;
        }

        if other.logging.level.is_some() {
            base.logging.level = other.logging.level.clone();
        }
        if other.logging.thread_ids.is_some() {
            base.logging.thread_ids = other.logging.thread_ids;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `KEYCLUSTER_CLUSTER_CONCURRENCY`, `KEYCLUSTER_LOG_LEVEL`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut KeyclusterConfig) {
        if let Some(v) = env_parse::<usize>("KEYCLUSTER_CLUSTER_CONCURRENCY") {
            config.cluster.concurrency = Some(v);
        }
        if let Some(v) = env_parse::<usize>("KEYCLUSTER_CLUSTER_CHUNK_SIZE") {
            config.cluster.chunk_size = Some(v);
        }
        if let Some(v) = env_parse::<usize>("KEYCLUSTER_CLUSTER_BATCH_SIZE") {
            config.cluster.batch_size = Some(v);
        }
        if let Some(v) = env_parse::<u32>("KEYCLUSTER_CLUSTER_MAX_ATTEMPTS") {
            config.cluster.max_attempts = Some(v);
        }
        if let Some(v) = env_parse::<usize>("KEYCLUSTER_CLUSTER_MIN_PARALLEL_VALUES") {
            config.cluster.min_parallel_values = Some(v);
        }
        if let Ok(val) = std::env::var("KEYCLUSTER_LOG_LEVEL") {
            config.logging.level = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut KeyclusterConfig, cli: &CliOverrides) {
        if let Some(v) = cli.concurrency {
            config.cluster.concurrency = Some(v);
        }
        if let Some(v) = cli.chunk_size {
            config.cluster.chunk_size = Some(v);
        }
        if let Some(v) = cli.batch_size {
            config.cluster.batch_size = Some(v);
        }
        if let Some(v) = cli.max_attempts {
            config.cluster.max_attempts = Some(v);
        }
        if let Some(ref v) = cli.log_level {
            config.logging.level = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Returns the user-level config directory: `~/.keycluster/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".keycluster"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
