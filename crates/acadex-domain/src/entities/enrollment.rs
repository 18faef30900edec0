//! Enrollment windows and enrollment records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DomainError, DomainResult},
    value_objects::{
        AcademicYearId, ClassCourseId, ClassId, EnrollmentRecordId, EnrollmentWindowId, ProfileId,
    },
};

/// Derived status of an enrollment window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStatus {
    Scheduled,
    Open,
    Closed,
}

/// Time-bounded period during which a class's students may be enrolled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentWindow {
    pub id: EnrollmentWindowId,
    pub class_id: ClassId,
    pub academic_year_id: AcademicYearId,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    /// Set when an authorized actor closed the window early; terminal
    pub force_closed_at: Option<DateTime<Utc>>,
    pub force_closed_by: Option<ProfileId>,
}

impl EnrollmentWindow {
    /// Schedule a new window, rejecting empty or inverted bounds
    pub fn schedule(
        class_id: ClassId,
        academic_year_id: AcademicYearId,
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if closes_at <= opens_at {
            return Err(DomainError::ValidationError {
                field: "closes_at".to_string(),
                reason: format!(
                    "window must close after it opens ({} <= {})",
                    closes_at, opens_at
                ),
            });
        }

        Ok(Self {
            id: EnrollmentWindowId::new(),
            class_id,
            academic_year_id,
            opens_at,
            closes_at,
            force_closed_at: None,
            force_closed_by: None,
        })
    }

    /// Status relative to `now`; a force-closed window stays closed
    pub fn status_at(&self, now: DateTime<Utc>) -> WindowStatus {
        if self.force_closed_at.is_some() {
            WindowStatus::Closed
        } else if now < self.opens_at {
            WindowStatus::Scheduled
        } else if now < self.closes_at {
            WindowStatus::Open
        } else {
            WindowStatus::Closed
        }
    }

    pub fn is_force_closed(&self) -> bool {
        self.force_closed_at.is_some()
    }

    /// Close the window early. Closing an already force-closed window keeps
    /// the original actor and timestamp.
    pub fn force_close(&mut self, actor: &ProfileId, at: DateTime<Utc>) {
        if self.force_closed_at.is_none() {
            self.force_closed_at = Some(at);
            self.force_closed_by = Some(actor.clone());
        }
    }
}

/// A student's enrollment in one class-course through one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: EnrollmentRecordId,
    pub student_profile_id: ProfileId,
    pub class_course_id: ClassCourseId,
    pub window_id: EnrollmentWindowId,
    pub enrolled_by: ProfileId,
    pub enrolled_at: DateTime<Utc>,
}

impl EnrollmentRecord {
    pub fn new(
        student_profile_id: ProfileId,
        class_course_id: ClassCourseId,
        window_id: EnrollmentWindowId,
        enrolled_by: ProfileId,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EnrollmentRecordId::new(),
            student_profile_id,
            class_course_id,
            window_id,
            enrolled_by,
            enrolled_at,
        }
    }

    /// Natural key: at most one record exists per key
    pub fn key(&self) -> (ProfileId, ClassCourseId, EnrollmentWindowId) {
        (
            self.student_profile_id.clone(),
            self.class_course_id.clone(),
            self.window_id,
        )
    }
}
