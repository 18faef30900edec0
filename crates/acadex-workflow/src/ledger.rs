//! Delegated-access ledger

use std::collections::HashSet;
use std::sync::Arc;

use acadex_domain::{
    AccessLogEntry, AccessLogRepository, AccessSource, ClassCourseId, Clock, DomainResult,
    InstitutionId, ProfileId,
};
use tracing::{debug, info};

use crate::storage::StorageGuard;

/// Append-only log of delegate accesses to class-course resources
///
/// The ledger has no update or delete path. Each call to [`record`] becomes
/// one atomic batch append; history accumulates across calls.
///
/// [`record`]: AccessLedger::record
pub struct AccessLedger {
    repository: Arc<dyn AccessLogRepository>,
    clock: Arc<dyn Clock>,
    storage: StorageGuard,
}

impl AccessLedger {
    pub fn new(
        repository: Arc<dyn AccessLogRepository>,
        clock: Arc<dyn Clock>,
        storage: StorageGuard,
    ) -> Self {
        Self {
            repository,
            clock,
            storage,
        }
    }

    /// Record that `actor` accessed each class-course as a delegate
    ///
    /// Duplicate ids are written once. An empty id list returns `Ok(0)`
    /// without touching storage. Either every entry is stored or none is.
    /// Returns the number of entries written.
    pub async fn record(
        &self,
        class_course_ids: &[ClassCourseId],
        actor: &ProfileId,
        institution: &InstitutionId,
        source: AccessSource,
    ) -> DomainResult<usize> {
        if class_course_ids.is_empty() {
            debug!(actor = %actor, "empty access batch, nothing to record");
            return Ok(0);
        }

        let occurred_at = self.clock.now();
        let mut seen = HashSet::with_capacity(class_course_ids.len());
        let entries: Vec<AccessLogEntry> = class_course_ids
            .iter()
            .filter(|id| seen.insert(*id))
            .map(|id| {
                AccessLogEntry::delegate(
                    id.clone(),
                    actor.clone(),
                    institution.clone(),
                    source,
                    occurred_at,
                )
            })
            .collect();

        self.storage
            .run("append_access_log", self.repository.append_batch(&entries))
            .await?;

        info!(
            actor = %actor,
            institution = %institution,
            source = %source,
            entries = entries.len(),
            "delegated access recorded"
        );
        Ok(entries.len())
    }

    /// Ledger entries for a class-course, oldest first
    pub async fn entries_for_class_course(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Vec<AccessLogEntry>> {
        self.storage
            .run("read_access_log", self.repository.find_by_class_course(class_course_id))
            .await
    }

    /// Ledger entries written for an actor, oldest first
    pub async fn entries_for_actor(&self, actor: &ProfileId) -> DomainResult<Vec<AccessLogEntry>> {
        self.storage
            .run("read_access_log", self.repository.find_by_actor(actor))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acadex_domain::{DomainError, FixedClock};
    use acadex_persistence::InMemoryAccessLogRepository;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn ledger() -> (AccessLedger, Arc<InMemoryAccessLogRepository>) {
        let repo = Arc::new(InMemoryAccessLogRepository::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
        ));
        let ledger = AccessLedger::new(repo.clone(), clock, StorageGuard::default());
        (ledger, repo)
    }

    fn ids(raw: &[&str]) -> Vec<ClassCourseId> {
        raw.iter().map(|s| ClassCourseId::new(*s)).collect()
    }

    fn admin() -> (ProfileId, InstitutionId) {
        (ProfileId::new("admin-1"), InstitutionId::new("inst-1"))
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop_even_when_store_is_down() {
        let (ledger, repo) = ledger();
        repo.set_offline(true);
        let (actor, inst) = admin();

        let written = ledger
            .record(&[], &actor, &inst, AccessSource::Export)
            .await
            .unwrap();

        assert_eq!(written, 0);
        repo.set_offline(false);
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_duplicates_coalesced_within_one_call() {
        let (ledger, repo) = ledger();
        let (actor, inst) = admin();

        let written = ledger
            .record(&ids(&["cc-1", "cc-1", "cc-2"]), &actor, &inst, AccessSource::GradingUi)
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(repo.count(), 2);
        let cc1 = ledger
            .entries_for_class_course(&ClassCourseId::new("cc-1"))
            .await
            .unwrap();
        assert_eq!(cc1.len(), 1);
        assert!(cc1[0].is_delegate);
        assert_eq!(cc1[0].source, AccessSource::GradingUi);
    }

    #[tokio::test]
    async fn test_history_accumulates_across_calls() {
        let (ledger, _repo) = ledger();
        let (actor, inst) = admin();
        for _ in 0..3 {
            ledger
                .record(&ids(&["cc-1"]), &actor, &inst, AccessSource::AdminOverride)
                .await
                .unwrap();
        }
        assert_eq!(ledger.entries_for_actor(&actor).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_batch_shares_actor_institution_and_time() {
        let (ledger, _repo) = ledger();
        let (actor, inst) = admin();
        ledger
            .record(&ids(&["cc-1", "cc-2", "cc-3"]), &actor, &inst, AccessSource::Export)
            .await
            .unwrap();

        let entries = ledger.entries_for_actor(&actor).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.institution_id == inst
            && e.occurred_at == entries[0].occurred_at
            && e.source == AccessSource::Export));
    }

    #[tokio::test]
    async fn test_store_failure_writes_nothing() {
        let (ledger, repo) = ledger();
        let (actor, inst) = admin();
        repo.set_offline(true);

        let err = ledger
            .record(&ids(&["cc-1", "cc-2"]), &actor, &inst, AccessSource::GradingUi)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::TransientStorageFailure { .. }));
        repo.set_offline(false);
        assert_eq!(repo.count(), 0);
    }

    proptest! {
        /// One entry per distinct id, whatever the duplication pattern
        #[test]
        fn test_written_count_equals_distinct_ids(raw in prop::collection::vec(0u8..6, 0..20)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (ledger, repo) = ledger();
            let (actor, inst) = admin();
            let batch: Vec<ClassCourseId> =
                raw.iter().map(|n| ClassCourseId::new(format!("cc-{}", n))).collect();
            let distinct: HashSet<_> = batch.iter().cloned().collect();

            let written = runtime
                .block_on(ledger.record(&batch, &actor, &inst, AccessSource::GradingUi))
                .unwrap();

            prop_assert_eq!(written, distinct.len());
            prop_assert_eq!(repo.count(), distinct.len());
        }
    }
}
