//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "KEYCLUSTER_LOG";

static INIT: Once = Once::new();

/// Initialize the keycluster tracing/logging system with default settings.
///
/// Reads `KEYCLUSTER_LOG` for per-crate log levels.
/// Format: `KEYCLUSTER_LOG=keycluster_engine=debug,keycluster_core=warn`
///
/// Falls back to `keycluster=info` if `KEYCLUSTER_LOG` is not set or is invalid.
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    init_tracing_with(&LoggingConfig::default());
}

/// Initialize tracing, using `config` for the fallback filter and layout.
///
/// `KEYCLUSTER_LOG` still takes precedence over `config.level`. If another
/// global subscriber is already installed, this is a no-op.
pub fn init_tracing_with(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_new(config.effective_level()))
            .unwrap_or_else(|_| EnvFilter::new("keycluster=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(config.effective_thread_ids())
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
