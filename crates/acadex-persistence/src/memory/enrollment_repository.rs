//! In-Memory Enrollment Repository Implementations

use std::collections::{HashMap, HashSet};

use acadex_domain::{
    AcademicYearId, ClassCourseId, ClassId, DomainResult, EnrollmentRecord,
    EnrollmentRecordRepository, EnrollmentWindow, EnrollmentWindowId, EnrollmentWindowRepository,
    ProfileId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::Availability;

/// Thread-safe in-memory implementation of EnrollmentWindowRepository
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentWindowRepository {
    windows: RwLock<HashMap<EnrollmentWindowId, EnrollmentWindow>>,
    availability: Availability,
}

impl InMemoryEnrollmentWindowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

#[async_trait]
impl EnrollmentWindowRepository for InMemoryEnrollmentWindowRepository {
    async fn insert_if_none_live(&self, window: &EnrollmentWindow) -> DomainResult<bool> {
        self.availability
            .check("enrollment_windows")
            .map_err(|e| e.during("insert_enrollment_window"))?;
        let mut windows = self.windows.write();
        let live_exists = windows.values().any(|w| {
            w.class_id == window.class_id
                && w.academic_year_id == window.academic_year_id
                && !w.is_force_closed()
        });
        if live_exists {
            return Ok(false);
        }
        windows.insert(window.id, window.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &EnrollmentWindowId) -> DomainResult<Option<EnrollmentWindow>> {
        self.availability
            .check("enrollment_windows")
            .map_err(|e| e.during("find_enrollment_window"))?;
        Ok(self.windows.read().get(id).cloned())
    }

    async fn find_for_class(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<Vec<EnrollmentWindow>> {
        self.availability
            .check("enrollment_windows")
            .map_err(|e| e.during("find_enrollment_window"))?;
        let mut found: Vec<_> = self
            .windows
            .read()
            .values()
            .filter(|w| &w.class_id == class_id && &w.academic_year_id == academic_year_id)
            .cloned()
            .collect();
        found.sort_by_key(|w| w.opens_at);
        Ok(found)
    }

    async fn force_close_if_open(
        &self,
        id: &EnrollmentWindowId,
        actor: &ProfileId,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<EnrollmentWindow>> {
        self.availability
            .check("enrollment_windows")
            .map_err(|e| e.during("force_close_enrollment_window"))?;
        let mut windows = self.windows.write();
        Ok(windows.get_mut(id).map(|stored| {
            stored.force_close(actor, at);
            stored.clone()
        }))
    }
}

type EnrollmentKey = (ProfileId, ClassCourseId, EnrollmentWindowId);

#[derive(Debug, Default)]
struct EnrollmentTable {
    rows: Vec<EnrollmentRecord>,
    keys: HashSet<EnrollmentKey>,
}

/// Thread-safe in-memory implementation of EnrollmentRecordRepository
///
/// A unique index on (student, class-course, window) backs `insert_missing`.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentRecordRepository {
    table: RwLock<EnrollmentTable>,
    availability: Availability,
}

impl InMemoryEnrollmentRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Get the current count of records (for testing)
    pub fn count(&self) -> usize {
        self.table.read().rows.len()
    }
}

#[async_trait]
impl EnrollmentRecordRepository for InMemoryEnrollmentRecordRepository {
    async fn insert_missing(&self, records: &[EnrollmentRecord]) -> DomainResult<usize> {
        self.availability
            .check("enrollment_records")
            .map_err(|e| e.during("insert_enrollments"))?;
        let mut table = self.table.write();
        let mut inserted = 0;
        for record in records {
            if table.keys.insert(record.key()) {
                table.rows.push(record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn count_for_class_course(&self, class_course_id: &ClassCourseId) -> DomainResult<usize> {
        self.availability
            .check("enrollment_records")
            .map_err(|e| e.during("count_enrollments"))?;
        Ok(self
            .table
            .read()
            .rows
            .iter()
            .filter(|r| &r.class_course_id == class_course_id)
            .count())
    }

    async fn find_by_window(
        &self,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<Vec<EnrollmentRecord>> {
        self.availability
            .check("enrollment_records")
            .map_err(|e| e.during("find_enrollments"))?;
        Ok(self
            .table
            .read()
            .rows
            .iter()
            .filter(|r| &r.window_id == window_id)
            .cloned()
            .collect())
    }
}
