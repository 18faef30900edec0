//! Bounded storage round-trips

use std::future::Future;
use std::time::Duration;

use acadex_config::StorageConfig;
use acadex_domain::{DomainError, DomainResult};
use tracing::warn;

/// Applies the configured deadline to every storage or collaborator call
///
/// A call that does not finish in time is reported as
/// [`DomainError::TransientStorageFailure`]; the storage primitives used
/// here are single atomic statements, so an abandoned call commits nothing.
#[derive(Debug, Clone, Copy)]
pub struct StorageGuard {
    timeout: Duration,
}

impl StorageGuard {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Await `call`, failing with a transient error once the deadline passes
    pub async fn run<T, F>(&self, operation: &str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "storage call timed out"
                );
                Err(DomainError::transient(
                    operation,
                    format!("no response within {}ms", self.timeout.as_millis()),
                ))
            }
        }
    }
}

impl Default for StorageGuard {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}
