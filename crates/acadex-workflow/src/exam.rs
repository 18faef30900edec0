//! Exam approval workflow
//!
//! | Action  | From        | To          | Allowed                                   |
//! |---------|-------------|-------------|-------------------------------------------|
//! | submit  | `draft`     | `submitted` | owner, substitute or administrator        |
//! | approve | `submitted` | `approved`  | dean (not the submitter, unless permitted)|
//! | lock    | `approved`  | `locked`    | owner, substitute or administrator        |
//!
//! The current status lives in the store. Every write is a compare-and-set
//! against the status the transition was computed from.

use std::sync::Arc;

use acadex_config::WorkflowConfig;
use acadex_domain::{
    ActorRole, Capability, ClassCourseId, Clock, DomainError, DomainResult,
    EnrollmentRecordRepository, ExamAction, ExamRecord, ExamRecordRepository, ExamStatus,
};
use tracing::{debug, info, warn};

use crate::{mediator::AccessDecision, storage::StorageGuard};

/// Role-gated state machine over per-class-course exam records
pub struct ExamWorkflow {
    exams: Arc<dyn ExamRecordRepository>,
    enrollments: Arc<dyn EnrollmentRecordRepository>,
    clock: Arc<dyn Clock>,
    storage: StorageGuard,
    policy: WorkflowConfig,
}

impl ExamWorkflow {
    pub fn new(
        exams: Arc<dyn ExamRecordRepository>,
        enrollments: Arc<dyn EnrollmentRecordRepository>,
        clock: Arc<dyn Clock>,
        storage: StorageGuard,
        policy: WorkflowConfig,
    ) -> Self {
        Self {
            exams,
            enrollments,
            clock,
            storage,
            policy,
        }
    }

    /// Move a class-course's exam from `draft` to `submitted`
    ///
    /// Creates the record on first use. Submitting an already submitted
    /// record returns it unchanged so that client retries are harmless.
    pub async fn submit(
        &self,
        decision: &AccessDecision,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        self.transition(decision, class_course_id, ExamAction::Submit)
            .await
    }

    /// Move a class-course's exam from `submitted` to `approved`
    pub async fn approve(
        &self,
        decision: &AccessDecision,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        self.transition(decision, class_course_id, ExamAction::Approve)
            .await
    }

    /// Move a class-course's exam from `approved` to the terminal `locked`
    pub async fn lock(
        &self,
        decision: &AccessDecision,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        self.transition(decision, class_course_id, ExamAction::Lock)
            .await
    }

    /// Stored record of a class-course, if one has been created
    pub async fn current(
        &self,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Option<ExamRecord>> {
        self.storage
            .run("find_exam_record", self.exams.find_by_class_course(class_course_id))
            .await
    }

    async fn transition(
        &self,
        decision: &AccessDecision,
        class_course_id: &ClassCourseId,
        action: ExamAction,
    ) -> DomainResult<ExamRecord> {
        decision.ensure_covers(class_course_id)?;
        Self::ensure_role(decision, action)?;

        let record = self.load(class_course_id, action).await?;

        if action == ExamAction::Submit && record.status == ExamStatus::Submitted {
            debug!(
                class_course_id = %class_course_id,
                "exam already submitted, returning stored record"
            );
            return Ok(record);
        }

        let next = record.advance(action, decision.actor(), self.clock.now())?;

        match action {
            ExamAction::Submit if self.policy.require_roster_for_submission => {
                self.ensure_roster(class_course_id).await?;
            }
            ExamAction::Approve if !self.policy.allow_self_approval => {
                if record.submitted_by.as_ref() == Some(decision.actor()) {
                    return Err(DomainError::unauthorized(
                        decision.actor().as_str(),
                        "an exam cannot be approved by the profile that submitted it",
                    ));
                }
            }
            _ => {}
        }

        let applied = self
            .storage
            .run("update_exam_record", self.exams.compare_and_set(record.status, &next))
            .await?;

        if !applied {
            let found = self
                .current(class_course_id)
                .await?
                .map_or(record.status, |r| r.status);
            warn!(
                class_course_id = %class_course_id,
                action = %action,
                expected = %record.status,
                found = %found,
                "concurrent exam transition lost the race"
            );
            return Err(DomainError::InvalidTransition {
                current: found,
                requested: action.target(),
            });
        }

        info!(
            class_course_id = %class_course_id,
            actor = %decision.actor(),
            delegated = decision.is_delegate(),
            from = %record.status,
            to = %next.status,
            "exam record advanced"
        );
        Ok(next)
    }

    /// Fetch the record an action applies to
    ///
    /// Only submission creates a missing record; any other action on a
    /// class-course without one is judged against an implicit `draft`.
    async fn load(
        &self,
        class_course_id: &ClassCourseId,
        action: ExamAction,
    ) -> DomainResult<ExamRecord> {
        if action == ExamAction::Submit {
            let draft = ExamRecord::draft(class_course_id.clone());
            return self
                .storage
                .run("insert_exam_record", self.exams.insert_if_absent(&draft))
                .await;
        }

        match self.current(class_course_id).await? {
            Some(record) => Ok(record),
            None => Err(DomainError::InvalidTransition {
                current: ExamStatus::Draft,
                requested: action.target(),
            }),
        }
    }

    async fn ensure_roster(&self, class_course_id: &ClassCourseId) -> DomainResult<()> {
        let enrolled = self
            .storage
            .run("count_enrollments", self.enrollments.count_for_class_course(class_course_id))
            .await?;
        if enrolled == 0 {
            return Err(DomainError::EmptyRoster {
                class_course_id: class_course_id.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_role(decision: &AccessDecision, action: ExamAction) -> DomainResult<()> {
        let allowed = match (action, decision.capability()) {
            (ExamAction::Approve, Capability::Delegate(ActorRole::Dean)) => true,
            (ExamAction::Approve, _) => false,
            (_, Capability::Owner) => true,
            (_, Capability::Delegate(ActorRole::Substitute | ActorRole::Administrator)) => true,
            _ => false,
        };
        if allowed {
            return Ok(());
        }

        let reason = match action {
            ExamAction::Approve => "approval requires a dean-level approver".to_string(),
            other => format!(
                "{} requires the teacher of record or an authorized delegate",
                other
            ),
        };
        Err(DomainError::unauthorized(decision.actor().as_str(), reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acadex_domain::{
        AccessSource, EnrollmentRecord, EnrollmentWindowId, FixedClock, InstitutionId, ProfileId,
    };
    use acadex_persistence::{InMemoryEnrollmentRecordRepository, InMemoryExamRecordRepository};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Exam store that suspends before every conditional write and counts
    /// the writes that found the status already moved
    struct RacingExams {
        inner: InMemoryExamRecordRepository,
        lost: AtomicUsize,
    }

    #[async_trait]
    impl ExamRecordRepository for RacingExams {
        async fn find_by_class_course(
            &self,
            class_course_id: &ClassCourseId,
        ) -> DomainResult<Option<ExamRecord>> {
            self.inner.find_by_class_course(class_course_id).await
        }

        async fn insert_if_absent(&self, record: &ExamRecord) -> DomainResult<ExamRecord> {
            self.inner.insert_if_absent(record).await
        }

        async fn compare_and_set(
            &self,
            expected: ExamStatus,
            record: &ExamRecord,
        ) -> DomainResult<bool> {
            tokio::task::yield_now().await;
            let applied = self.inner.compare_and_set(expected, record).await?;
            if !applied {
                self.lost.fetch_add(1, Ordering::SeqCst);
            }
            Ok(applied)
        }
    }

    struct Fixture {
        workflow: ExamWorkflow,
        exams: Arc<InMemoryExamRecordRepository>,
        enrollments: Arc<InMemoryEnrollmentRecordRepository>,
        clock: Arc<FixedClock>,
    }

    fn fixture(policy: WorkflowConfig) -> Fixture {
        let exams = Arc::new(InMemoryExamRecordRepository::new());
        let enrollments = Arc::new(InMemoryEnrollmentRecordRepository::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
        ));
        let workflow = ExamWorkflow::new(
            exams.clone(),
            enrollments.clone(),
            clock.clone(),
            StorageGuard::default(),
            policy,
        );
        Fixture {
            workflow,
            exams,
            enrollments,
            clock,
        }
    }

    fn decision(actor: &str, capability: Capability, cc: &str) -> AccessDecision {
        AccessDecision::granted(
            ProfileId::new(actor),
            InstitutionId::new("inst-1"),
            capability,
            vec![ClassCourseId::new(cc)],
            AccessSource::GradingUi,
        )
    }

    fn teacher(cc: &str) -> AccessDecision {
        decision("t-1", Capability::Owner, cc)
    }

    fn dean(cc: &str) -> AccessDecision {
        decision("d-1", Capability::Delegate(ActorRole::Dean), cc)
    }

    fn cc(id: &str) -> ClassCourseId {
        ClassCourseId::new(id)
    }

    #[tokio::test]
    async fn test_lifecycle_in_order() {
        let f = fixture(WorkflowConfig::default());

        let submitted = f.workflow.submit(&teacher("cc-42"), &cc("cc-42")).await.unwrap();
        assert_eq!(submitted.status, ExamStatus::Submitted);
        assert_eq!(submitted.submitted_by, Some(ProfileId::new("t-1")));

        f.clock.advance(Duration::hours(1));
        let approved = f.workflow.approve(&dean("cc-42"), &cc("cc-42")).await.unwrap();
        assert_eq!(approved.approved_by, Some(ProfileId::new("d-1")));

        f.clock.advance(Duration::hours(1));
        let locked = f.workflow.lock(&teacher("cc-42"), &cc("cc-42")).await.unwrap();
        assert_eq!(locked.status, ExamStatus::Locked);
        assert!(locked.submitted_at <= locked.approved_at);
        assert!(locked.approved_at <= locked.locked_at);

        let err = f.workflow.submit(&teacher("cc-42"), &cc("cc-42")).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                current: ExamStatus::Locked,
                requested: ExamStatus::Submitted,
            }
        );
    }

    #[tokio::test]
    async fn test_resubmit_is_idempotent() {
        let f = fixture(WorkflowConfig::default());
        let first = f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap();
        f.clock.advance(Duration::minutes(10));
        let retry = f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap();

        assert_eq!(retry, first);
        assert_eq!(f.exams.count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_order_transitions_rejected() {
        let f = fixture(WorkflowConfig::default());

        let err = f.workflow.lock(&teacher("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                current: ExamStatus::Draft,
                requested: ExamStatus::Locked,
            }
        );
        // Only submission creates the row.
        assert_eq!(f.exams.count(), 0);

        f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap();
        let err = f.workflow.lock(&teacher("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                current: ExamStatus::Submitted,
                requested: ExamStatus::Locked,
            }
        ));

        f.workflow.approve(&dean("cc-1"), &cc("cc-1")).await.unwrap();
        let err = f.workflow.approve(&dean("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                current: ExamStatus::Approved,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_roles_are_enforced() {
        let f = fixture(WorkflowConfig::default());

        let err = f
            .workflow
            .submit(&decision("d-1", Capability::Delegate(ActorRole::Dean), "cc-1"), &cc("cc-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));

        f.workflow
            .submit(
                &decision("sub-1", Capability::Delegate(ActorRole::Substitute), "cc-1"),
                &cc("cc-1"),
            )
            .await
            .unwrap();

        let err = f.workflow.approve(&teacher("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));

        let err = f
            .workflow
            .approve(
                &decision("admin-1", Capability::Delegate(ActorRole::Administrator), "cc-1"),
                &cc("cc-1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_decision_must_cover_class_course() {
        let f = fixture(WorkflowConfig::default());
        let err = f.workflow.submit(&teacher("cc-1"), &cc("cc-2")).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_submitter_cannot_self_approve_unless_permitted() {
        let dean_as_submitter = || decision("d-1", Capability::Delegate(ActorRole::Dean), "cc-1");

        let f = fixture(WorkflowConfig::default());
        // Seed a record submitted by the same profile that will try to approve.
        let draft = f
            .exams
            .insert_if_absent(&ExamRecord::draft(cc("cc-1")))
            .await
            .unwrap();
        let submitted = draft
            .advance(ExamAction::Submit, &ProfileId::new("d-1"), f.clock.now())
            .unwrap();
        assert!(f.exams.compare_and_set(ExamStatus::Draft, &submitted).await.unwrap());

        let err = f.workflow.approve(&dean_as_submitter(), &cc("cc-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));

        let permissive = fixture(WorkflowConfig {
            allow_self_approval: true,
            ..WorkflowConfig::default()
        });
        permissive.exams.insert_if_absent(&submitted).await.unwrap();
        let approved = permissive
            .workflow
            .approve(&dean_as_submitter(), &cc("cc-1"))
            .await
            .unwrap();
        assert_eq!(approved.status, ExamStatus::Approved);
    }

    #[tokio::test]
    async fn test_roster_policy_blocks_empty_class_course() {
        let f = fixture(WorkflowConfig {
            require_roster_for_submission: true,
            ..WorkflowConfig::default()
        });

        let err = f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::EmptyRoster { .. }));
        let stored = f.workflow.current(&cc("cc-1")).await.unwrap().unwrap();
        assert_eq!(stored.status, ExamStatus::Draft);

        f.enrollments
            .insert_missing(&[EnrollmentRecord::new(
                ProfileId::new("s-1"),
                cc("cc-1"),
                EnrollmentWindowId::new(),
                ProfileId::new("t-1"),
                f.clock.now(),
            )])
            .await
            .unwrap();
        let submitted = f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap();
        assert_eq!(submitted.status, ExamStatus::Submitted);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_exactly_one_wins() {
        let exams = Arc::new(RacingExams {
            inner: InMemoryExamRecordRepository::new(),
            lost: AtomicUsize::new(0),
        });
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap(),
        ));
        let workflow = ExamWorkflow::new(
            exams.clone(),
            Arc::new(InMemoryEnrollmentRecordRepository::new()),
            clock,
            StorageGuard::default(),
            WorkflowConfig::default(),
        );
        workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap();

        let first = decision("d-1", Capability::Delegate(ActorRole::Dean), "cc-1");
        let second = decision("d-2", Capability::Delegate(ActorRole::Dean), "cc-1");
        let id_a = cc("cc-1");
        let id_b = cc("cc-1");
        let (a, b) = tokio::join!(
            workflow.approve(&first, &id_a),
            workflow.approve(&second, &id_b),
        );

        // Both read `submitted` before either wrote.
        assert_eq!(exams.lost.load(Ordering::SeqCst), 1);
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(DomainError::InvalidTransition {
                current: ExamStatus::Approved,
                requested: ExamStatus::Approved,
            })
        )));
        let stored = workflow.current(&cc("cc-1")).await.unwrap().unwrap();
        assert_eq!(stored.status, ExamStatus::Approved);
    }

    #[tokio::test]
    async fn test_storage_outage_surfaces_as_transient() {
        let f = fixture(WorkflowConfig::default());
        f.exams.set_offline(true);
        let err = f.workflow.submit(&teacher("cc-1"), &cc("cc-1")).await.unwrap_err();
        assert!(err.is_retryable());
        f.exams.set_offline(false);
        assert_eq!(f.exams.count(), 0);
    }
}
