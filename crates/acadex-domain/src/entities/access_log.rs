//! Delegated-access audit entries

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AccessLogEntryId, ClassCourseId, InstitutionId, ProfileId};

/// Where a delegated access originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    /// Grade entry screens
    GradingUi,
    /// Grade or roster export
    Export,
    /// Administrative override tooling
    AdminOverride,
    /// Exam submission, approval or locking
    ExamWorkflow,
    /// Enrollment window management and auto-enrollment
    Enrollment,
}

impl AccessSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessSource::GradingUi => "grading_ui",
            AccessSource::Export => "export",
            AccessSource::AdminOverride => "admin_override",
            AccessSource::ExamWorkflow => "exam_workflow",
            AccessSource::Enrollment => "enrollment",
        }
    }
}

impl fmt::Display for AccessSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delegated access to one class-course
///
/// Insert-only. Nothing in the system updates or deletes an entry once it
/// has been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub id: AccessLogEntryId,
    pub class_course_id: ClassCourseId,
    pub actor_profile_id: ProfileId,
    pub institution_id: InstitutionId,
    pub source: AccessSource,
    pub is_delegate: bool,
    pub occurred_at: DateTime<Utc>,
}

impl AccessLogEntry {
    /// Create a delegate access entry
    pub fn delegate(
        class_course_id: ClassCourseId,
        actor_profile_id: ProfileId,
        institution_id: InstitutionId,
        source: AccessSource,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccessLogEntryId::new(),
            class_course_id,
            actor_profile_id,
            institution_id,
            source,
            is_delegate: true,
            occurred_at,
        }
    }
}
