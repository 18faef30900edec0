//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    error::{ConfigError, Result},
    types::LoggingConfig,
};

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over `logging.level` when set. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_lowercase()))
        .map_err(|e| ConfigError::Validation(format!("logging.level: {}", e)))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ConfigError::Validation(format!("logging already initialized: {}", e)))
}
