//! Enrollment windows and bulk auto-enrollment

use std::collections::HashSet;
use std::sync::Arc;

use acadex_domain::{
    AcademicYearId, ActorRole, Capability, ClassCourseCatalog, ClassId, Clock, DomainError,
    DomainResult, EnrollmentRecord, EnrollmentRecordRepository, EnrollmentWindow,
    EnrollmentWindowId, EnrollmentWindowRepository, ProfileId, RosterProvider, WindowStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{mediator::AccessDecision, storage::StorageGuard};

/// Outcome of one auto-enrollment run
///
/// Counts are per (student, class-course) pair, not per student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrollmentSummary {
    pub window_id: EnrollmentWindowId,
    /// (student, class-course) pairs enrolled by this run
    pub created: usize,
    /// Pairs that were already enrolled in the window
    pub skipped: usize,
    pub delegated: bool,
}

pub struct EnrollmentWindowManager {
    windows: Arc<dyn EnrollmentWindowRepository>,
    records: Arc<dyn EnrollmentRecordRepository>,
    roster: Arc<dyn RosterProvider>,
    catalog: Arc<dyn ClassCourseCatalog>,
    clock: Arc<dyn Clock>,
    storage: StorageGuard,
}

impl EnrollmentWindowManager {
    pub fn new(
        windows: Arc<dyn EnrollmentWindowRepository>,
        records: Arc<dyn EnrollmentRecordRepository>,
        roster: Arc<dyn RosterProvider>,
        catalog: Arc<dyn ClassCourseCatalog>,
        clock: Arc<dyn Clock>,
        storage: StorageGuard,
    ) -> Self {
        Self {
            windows,
            records,
            roster,
            catalog,
            clock,
            storage,
        }
    }

    /// Schedule a window for a class in an academic year
    ///
    /// Fails with a validation error when the bounds are inverted or the
    /// pair already has a window that was not force-closed.
    pub async fn open_window(
        &self,
        decision: &AccessDecision,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> DomainResult<EnrollmentWindow> {
        decision.ensure_covers_class(class_id)?;
        Self::ensure_manager(decision)?;

        let window = EnrollmentWindow::schedule(
            class_id.clone(),
            academic_year_id.clone(),
            opens_at,
            closes_at,
        )?;
        let inserted = self
            .storage
            .run("insert_enrollment_window", self.windows.insert_if_none_live(&window))
            .await?;
        if !inserted {
            return Err(DomainError::ValidationError {
                field: "class_id".to_string(),
                reason: format!(
                    "class {} already has a live enrollment window for {}",
                    class_id, academic_year_id
                ),
            });
        }

        info!(
            window_id = %window.id,
            class_id = %class_id,
            academic_year_id = %academic_year_id,
            opens_at = %opens_at,
            closes_at = %closes_at,
            "enrollment window scheduled"
        );
        Ok(window)
    }

    /// Close a window early; closing it again changes nothing
    ///
    /// Concurrent closers race on a conditional update in the store; every
    /// caller gets back the window as the first closer left it.
    pub async fn force_close(
        &self,
        decision: &AccessDecision,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<EnrollmentWindow> {
        let window = self.window(window_id).await?;
        decision.ensure_covers_class(&window.class_id)?;
        Self::ensure_manager(decision)?;

        if window.is_force_closed() {
            debug!(window_id = %window_id, "enrollment window already force-closed");
            return Ok(window);
        }

        let closed = self
            .storage
            .run(
                "force_close_enrollment_window",
                self.windows
                    .force_close_if_open(window_id, decision.actor(), self.clock.now()),
            )
            .await?
            .ok_or_else(|| window_not_found(window_id))?;

        if closed.force_closed_by.as_ref() == Some(decision.actor()) {
            info!(
                window_id = %window_id,
                actor = %decision.actor(),
                "enrollment window force-closed"
            );
        } else {
            debug!(
                window_id = %window_id,
                actor = %decision.actor(),
                "enrollment window was force-closed concurrently"
            );
        }
        Ok(closed)
    }

    pub async fn find_window(
        &self,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<Option<EnrollmentWindow>> {
        self.storage
            .run("find_enrollment_window", self.windows.find_by_id(window_id))
            .await
    }

    pub(crate) async fn window(
        &self,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<EnrollmentWindow> {
        self.find_window(window_id)
            .await?
            .ok_or_else(|| window_not_found(window_id))
    }

    pub async fn window_status(
        &self,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<WindowStatus> {
        let window = self.window(window_id).await?;
        Ok(window.status_at(self.clock.now()))
    }

    /// Enroll every rostered student of a class in each class-course the
    /// class is offered that year
    ///
    /// Pairs already enrolled in the resolved window are skipped, so running
    /// this twice on an unchanged roster creates nothing the second time.
    pub async fn auto_enroll(
        &self,
        decision: &AccessDecision,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<EnrollmentSummary> {
        decision.ensure_covers_class(class_id)?;
        Self::ensure_manager(decision)?;

        let window = self.resolve_window(class_id, academic_year_id).await?;

        let students = self
            .storage
            .run("list_students", self.roster.list_students(class_id))
            .await?;
        let class_courses = self
            .storage
            .run(
                "class_courses_for",
                self.catalog.class_courses_for(class_id, academic_year_id),
            )
            .await?;

        let now = self.clock.now();
        let mut seen_students = HashSet::new();
        let mut seen_courses = HashSet::new();
        let class_courses: Vec<_> = class_courses
            .into_iter()
            .filter(|cc| seen_courses.insert(cc.clone()))
            .collect();
        let courses = &class_courses;
        let window_id = window.id;
        let pairs: Vec<EnrollmentRecord> = students
            .into_iter()
            .filter(|s: &ProfileId| seen_students.insert(s.clone()))
            .flat_map(move |student| {
                courses.iter().map(move |cc| {
                    EnrollmentRecord::new(
                        student.clone(),
                        cc.clone(),
                        window_id,
                        decision.actor().clone(),
                        now,
                    )
                })
            })
            .collect();

        let created = if pairs.is_empty() {
            0
        } else {
            self.storage
                .run("insert_enrollments", self.records.insert_missing(&pairs))
                .await?
        };

        let summary = EnrollmentSummary {
            window_id: window.id,
            created,
            skipped: pairs.len().saturating_sub(created),
            delegated: decision.is_delegate(),
        };
        info!(
            class_id = %class_id,
            academic_year_id = %academic_year_id,
            window_id = %window.id,
            actor = %decision.actor(),
            delegated = summary.delegated,
            created = summary.created,
            skipped = summary.skipped,
            "auto-enrollment finished"
        );
        Ok(summary)
    }

    /// The window open right now, else the latest one not force-closed
    async fn resolve_window(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<EnrollmentWindow> {
        let windows = self
            .storage
            .run(
                "find_enrollment_window",
                self.windows.find_for_class(class_id, academic_year_id),
            )
            .await?;
        let now = self.clock.now();

        if let Some(open) = windows.iter().find(|w| w.status_at(now) == WindowStatus::Open) {
            return Ok(open.clone());
        }
        windows
            .into_iter()
            .filter(|w| !w.is_force_closed())
            .max_by_key(|w| w.opens_at)
            .ok_or_else(|| DomainError::NoActiveWindow {
                class_id: class_id.to_string(),
                academic_year_id: academic_year_id.to_string(),
            })
    }

    fn ensure_manager(decision: &AccessDecision) -> DomainResult<()> {
        match decision.capability() {
            Capability::Owner
            | Capability::Delegate(ActorRole::Administrator | ActorRole::Dean) => Ok(()),
            _ => Err(DomainError::unauthorized(
                decision.actor().as_str(),
                "enrollment is managed by the class owner or an administrator",
            )),
        }
    }
}

fn window_not_found(window_id: &EnrollmentWindowId) -> DomainError {
    DomainError::EntityNotFound {
        entity_type: "EnrollmentWindow".to_string(),
        id: window_id.to_string(),
    }
}
