//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `KEYCLUSTER_LOG` is unset.
    /// Default: `keycluster=info`.
    pub level: Option<String>,
    /// Include thread ids in log lines. Default: true.
    pub thread_ids: Option<bool>,
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        self.level.as_deref().unwrap_or("keycluster=info")
    }

    pub fn effective_thread_ids(&self) -> bool {
        self.thread_ids.unwrap_or(true)
    }
}
