//! In-Memory Exam Record Repository Implementation

use std::collections::HashMap;

use acadex_domain::{ClassCourseId, DomainResult, ExamRecord, ExamRecordRepository, ExamStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::Availability;

/// Thread-safe in-memory implementation of ExamRecordRepository
///
/// Rows are keyed by class-course. `compare_and_set` checks and writes under
/// one write guard, so two racing transitions cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryExamRecordRepository {
    records: RwLock<HashMap<ClassCourseId, ExamRecord>>,
    availability: Availability,
}

impl InMemoryExamRecordRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Get the current count of records (for testing)
    pub fn count(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl ExamRecordRepository for InMemoryExamRecordRepository {
    async fn find_by_class_course(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Option<ExamRecord>> {
        self.availability
            .check("exam_records")
            .map_err(|e| e.during("find_exam_record"))?;
        Ok(self.records.read().get(class_course_id).cloned())
    }

    async fn insert_if_absent(&self, record: &ExamRecord) -> DomainResult<ExamRecord> {
        self.availability
            .check("exam_records")
            .map_err(|e| e.during("insert_exam_record"))?;
        let mut records = self.records.write();
        let stored = records
            .entry(record.class_course_id.clone())
            .or_insert_with(|| record.clone());
        Ok(stored.clone())
    }

    async fn compare_and_set(
        &self,
        expected: ExamStatus,
        record: &ExamRecord,
    ) -> DomainResult<bool> {
        self.availability
            .check("exam_records")
            .map_err(|e| e.during("update_exam_record"))?;
        let mut records = self.records.write();
        match records.get_mut(&record.class_course_id) {
            Some(current) if current.status == expected => {
                *current = record.clone();
                Ok(true)
            }
            Some(current) => {
                debug!(
                    class_course_id = %record.class_course_id,
                    expected = %expected,
                    found = %current.status,
                    "exam record compare-and-set lost"
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
