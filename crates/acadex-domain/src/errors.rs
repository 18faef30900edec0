//! Domain errors for Acadex

use thiserror::Error;

use crate::entities::ExamStatus;

/// Core domain errors
///
/// Every failure an operation can report to its caller. Nothing below the
/// service layer swallows these; the access mediator is the only place a
/// storage failure is reclassified (into [`DomainError::Unauthorized`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Requested transition is not legal from the current state
    #[error("Invalid transition: cannot move exam record from {current} to {requested}")]
    InvalidTransition {
        current: ExamStatus,
        requested: ExamStatus,
    },

    #[error("Unauthorized: {actor} - {reason}")]
    Unauthorized { actor: String, reason: String },

    #[error("No active enrollment window for class {class_id} in academic year {academic_year_id}")]
    NoActiveWindow {
        class_id: String,
        academic_year_id: String,
    },

    /// Persistence call failed or timed out; nothing was committed
    #[error("Transient storage failure during {operation}: {reason}")]
    TransientStorageFailure { operation: String, reason: String },

    #[error("Class-course {class_course_id} has no enrolled students")]
    EmptyRoster { class_course_id: String },

    #[error("Validation error: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    EntityNotFound { entity_type: String, id: String },
}

impl DomainError {
    /// Create an unauthorized error
    pub fn unauthorized(actor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            actor: actor.into(),
            reason: reason.into(),
        }
    }

    /// Create a transient storage failure
    pub fn transient(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransientStorageFailure {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may safely retry the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStorageFailure { .. })
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
