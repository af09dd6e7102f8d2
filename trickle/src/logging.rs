//! Logging setup for the binary.
//!
//! Logs go to stderr so the throttled output on stdout stays clean.
//! `RUST_LOG` overrides the configured level.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (default: INFO).
    pub level: Level,
    /// Emit JSON lines instead of human-readable text (default: false).
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
        }
    }
}

/// The filter directive applied when `RUST_LOG` is unset.
fn default_directive(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    // Keep dependencies quiet unless asked.
    format!("warn,trickle={level},trickle_sink={level},trickle_types={level},trickle_memory={level},trickle_provider_openai={level}")
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
