//! Acadex Configuration Management
//!
//! Loads workflow policy, storage and logging settings from an optional TOML
//! file layered under `ACADEX_`-prefixed environment variables, and validates
//! the result before services are built from it. [`logging::init_logging`]
//! installs the process-wide tracing subscriber from the logging section.

pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{AcadexConfig, LoggingConfig, StorageConfig, WorkflowConfig};
