//! Exam record aggregate and its approval lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DomainError, DomainResult},
    value_objects::{ClassCourseId, ExamRecordId, ProfileId},
};

/// Exam lifecycle states
///
/// `Locked` is terminal. There is no transition back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    /// Grades are being prepared
    Draft,
    /// Handed in by the teacher, awaiting approval
    Submitted,
    /// Approved by a dean-level approver
    Approved,
    /// Frozen; no further changes through the workflow
    Locked,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Submitted => "submitted",
            ExamStatus::Approved => "approved",
            ExamStatus::Locked => "locked",
        }
    }

    /// Apply an action to this state
    ///
    /// Total over every (state, action) pair: illegal pairs return
    /// [`DomainError::InvalidTransition`] naming this state and the action's
    /// target state.
    pub fn apply(self, action: ExamAction) -> DomainResult<ExamStatus> {
        match (self, action) {
            (ExamStatus::Draft, ExamAction::Submit) => Ok(ExamStatus::Submitted),
            (ExamStatus::Submitted, ExamAction::Approve) => Ok(ExamStatus::Approved),
            (ExamStatus::Approved, ExamAction::Lock) => Ok(ExamStatus::Locked),
            (current, action) => Err(DomainError::InvalidTransition {
                current,
                requested: action.target(),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExamStatus::Locked)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions that advance an exam record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamAction {
    Submit,
    Approve,
    Lock,
}

impl ExamAction {
    /// The only state this action may start from
    pub fn source(&self) -> ExamStatus {
        match self {
            ExamAction::Submit => ExamStatus::Draft,
            ExamAction::Approve => ExamStatus::Submitted,
            ExamAction::Lock => ExamStatus::Approved,
        }
    }

    /// The state this action moves a record into
    pub fn target(&self) -> ExamStatus {
        match self {
            ExamAction::Submit => ExamStatus::Submitted,
            ExamAction::Approve => ExamStatus::Approved,
            ExamAction::Lock => ExamStatus::Locked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamAction::Submit => "submit",
            ExamAction::Approve => "approve",
            ExamAction::Lock => "lock",
        }
    }
}

impl fmt::Display for ExamAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exam record for one class-course
///
/// Each stage's actor and timestamp is written exactly once, by the
/// transition into that stage, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: ExamRecordId,
    pub class_course_id: ClassCourseId,
    pub status: ExamStatus,
    pub submitted_by: Option<ProfileId>,
    pub approved_by: Option<ProfileId>,
    pub locked_by: Option<ProfileId>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl ExamRecord {
    /// Create a fresh record in `Draft`
    pub fn draft(class_course_id: ClassCourseId) -> Self {
        Self {
            id: ExamRecordId::new(),
            class_course_id,
            status: ExamStatus::Draft,
            submitted_by: None,
            approved_by: None,
            locked_by: None,
            submitted_at: None,
            approved_at: None,
            locked_at: None,
        }
    }

    /// Produce the record that results from `action` performed by `actor` at `at`
    ///
    /// The receiver is left untouched so the caller can compare-and-set
    /// against the status it was read with.
    pub fn advance(
        &self,
        action: ExamAction,
        actor: &ProfileId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let next_status = self.status.apply(action)?;
        // Stage timestamps never go backwards, even if the caller's clock does.
        let at = self.latest_timestamp().map_or(at, |latest| at.max(latest));

        let mut next = self.clone();
        next.status = next_status;
        match action {
            ExamAction::Submit => {
                next.submitted_by = Some(actor.clone());
                next.submitted_at = Some(at);
            }
            ExamAction::Approve => {
                next.approved_by = Some(actor.clone());
                next.approved_at = Some(at);
            }
            ExamAction::Lock => {
                next.locked_by = Some(actor.clone());
                next.locked_at = Some(at);
            }
        }
        Ok(next)
    }

    fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        [self.submitted_at, self.approved_at, self.locked_at]
            .into_iter()
            .flatten()
            .max()
    }
}
