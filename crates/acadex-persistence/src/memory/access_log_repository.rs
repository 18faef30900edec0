//! In-Memory Access Log Repository Implementation

use acadex_domain::{AccessLogEntry, AccessLogRepository, ClassCourseId, DomainResult, ProfileId};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::Availability;

/// Append-only in-memory access log
///
/// Exposes no way to modify or remove an entry. A batch is appended under one
/// write guard after the availability check, so it lands whole or not at all.
#[derive(Debug, Default)]
pub struct InMemoryAccessLogRepository {
    entries: RwLock<Vec<AccessLogEntry>>,
    availability: Availability,
}

impl InMemoryAccessLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Get the current count of entries (for testing)
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }
}

#[async_trait]
impl AccessLogRepository for InMemoryAccessLogRepository {
    async fn append_batch(&self, entries: &[AccessLogEntry]) -> DomainResult<()> {
        self.availability
            .check("access_log")
            .map_err(|e| e.during("append_access_log"))?;
        self.entries.write().extend_from_slice(entries);
        Ok(())
    }

    async fn find_by_class_course(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Vec<AccessLogEntry>> {
        self.availability
            .check("access_log")
            .map_err(|e| e.during("read_access_log"))?;
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| &e.class_course_id == class_course_id)
            .cloned()
            .collect())
    }

    async fn find_by_actor(
        &self,
        actor_profile_id: &ProfileId,
    ) -> DomainResult<Vec<AccessLogEntry>> {
        self.availability
            .check("access_log")
            .map_err(|e| e.during("read_access_log"))?;
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| &e.actor_profile_id == actor_profile_id)
            .cloned()
            .collect())
    }
}
