//! Core configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AcadexConfig {
    /// Exam workflow policy
    pub workflow: WorkflowConfig,
    /// Persistence call limits
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Exam workflow policy switches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Refuse submission for a class-course with no enrolled students
    pub require_roster_for_submission: bool,
    /// Let the profile that submitted an exam also approve it
    pub allow_self_approval: bool,
}

/// Storage call settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Upper bound for a single storage round-trip, in milliseconds
    pub timeout_ms: u64,
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
