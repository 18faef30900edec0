//! Repository interfaces for data persistence
//!
//! Infrastructure implements domain interfaces. Every serialization point the
//! workflow relies on is a storage primitive declared here: a conditional
//! update for exam records and atomic multi-row inserts for the ledger and
//! enrollment records. Services never hold an in-process lock across calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    entities::{AccessLogEntry, EnrollmentRecord, EnrollmentWindow, ExamRecord, ExamStatus},
    errors::DomainResult,
    value_objects::{AcademicYearId, ClassCourseId, ClassId, EnrollmentWindowId, ProfileId},
};

/// Repository for exam records, keyed by class-course
#[async_trait]
pub trait ExamRecordRepository: Send + Sync {
    /// Find the record of a class-course
    async fn find_by_class_course(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Option<ExamRecord>>;

    /// Insert `record` unless the class-course already has one
    ///
    /// Returns whichever record is stored afterwards.
    async fn insert_if_absent(&self, record: &ExamRecord) -> DomainResult<ExamRecord>;

    /// Replace the stored record only if its status still equals `expected`
    ///
    /// Returns `false` when the row is missing or another writer already
    /// moved it; nothing is written in that case.
    async fn compare_and_set(
        &self,
        expected: ExamStatus,
        record: &ExamRecord,
    ) -> DomainResult<bool>;
}

/// Append-only store for delegated-access entries
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    /// Append every entry or none of them
    async fn append_batch(&self, entries: &[AccessLogEntry]) -> DomainResult<()>;

    /// Entries for a class-course, oldest first
    async fn find_by_class_course(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Vec<AccessLogEntry>>;

    /// Entries written on behalf of an actor, oldest first
    async fn find_by_actor(
        &self,
        actor_profile_id: &ProfileId,
    ) -> DomainResult<Vec<AccessLogEntry>>;
}

/// Repository for enrollment windows
#[async_trait]
pub trait EnrollmentWindowRepository: Send + Sync {
    /// Insert `window` unless its (class, academic year) already has a window
    /// that has not been force-closed. Returns `false` when rejected.
    async fn insert_if_none_live(&self, window: &EnrollmentWindow) -> DomainResult<bool>;

    async fn find_by_id(&self, id: &EnrollmentWindowId) -> DomainResult<Option<EnrollmentWindow>>;

    /// All window instances of a class in an academic year
    async fn find_for_class(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<Vec<EnrollmentWindow>>;

    /// Force-close a window unless it is already force-closed
    ///
    /// The check and the write happen as one conditional update, so the
    /// first closer is kept. Returns the stored window afterwards, or `None`
    /// when no window has this id.
    async fn force_close_if_open(
        &self,
        id: &EnrollmentWindowId,
        actor: &ProfileId,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<EnrollmentWindow>>;
}

/// Repository for enrollment records
#[async_trait]
pub trait EnrollmentRecordRepository: Send + Sync {
    /// Atomically insert every record whose (student, class-course, window)
    /// key is not stored yet. Returns the number of rows inserted.
    async fn insert_missing(&self, records: &[EnrollmentRecord]) -> DomainResult<usize>;

    /// Number of students enrolled in a class-course across all windows
    async fn count_for_class_course(&self, class_course_id: &ClassCourseId) -> DomainResult<usize>;

    async fn find_by_window(
        &self,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<Vec<EnrollmentRecord>>;
}
