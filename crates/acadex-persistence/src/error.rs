//! Persistence Layer Error Types
//!
//! Error mapping to domain types

use acadex_domain::DomainError;
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Backing store is unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Store rejected or failed the statement
    #[error("Database error: {0}")]
    Database(String),
}

impl PersistenceError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Convert into a domain error, naming the operation that failed
    pub fn during(self, operation: &str) -> DomainError {
        match self {
            PersistenceError::NotFound { entity_type, id } => DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            },
            PersistenceError::Connection(msg) | PersistenceError::Database(msg) => {
                DomainError::transient(operation, msg)
            }
        }
    }
}

/// Convert persistence errors to domain errors
impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        err.during("storage")
    }
}
