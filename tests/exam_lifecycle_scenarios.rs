//! End-to-end exam lifecycle through the access mediator

mod common;

use acadex_config::{AcadexConfig, WorkflowConfig};
use acadex_domain::{AccessSource, DomainError, ExamStatus, ProfileId};
use chrono::Duration;
use common::{cc, class, ctx, harness, start, year};

#[tokio::test]
async fn test_cc42_full_lifecycle_then_resubmit_rejected() {
    let h = harness(AcadexConfig::default());
    let teacher = ctx("t-1", AccessSource::GradingUi);
    let dean = ctx("d-1", AccessSource::ExamWorkflow);

    let submitted = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap();
    assert_eq!(submitted.status, ExamStatus::Submitted);

    h.clock.advance(Duration::hours(2));
    let approved = h.mediator.approve_exam(&dean, &cc("cc-42")).await.unwrap();
    assert_eq!(approved.status, ExamStatus::Approved);
    assert_eq!(approved.approved_by, Some(ProfileId::new("d-1")));

    h.clock.advance(Duration::hours(2));
    let locked = h.mediator.lock_exam(&teacher, &cc("cc-42")).await.unwrap();
    assert_eq!(locked.status, ExamStatus::Locked);
    assert_eq!(locked.locked_by, Some(ProfileId::new("t-1")));

    let err = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidTransition {
            current: ExamStatus::Locked,
            requested: ExamStatus::Submitted,
        }
    );

    // Only the dean acted as a delegate.
    let history = h
        .mediator
        .access_history(&teacher, &cc("cc-42"))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].actor_profile_id, ProfileId::new("d-1"));
    assert_eq!(history[0].source, AccessSource::ExamWorkflow);
    assert!(history[0].is_delegate);
}

#[tokio::test]
async fn test_resubmit_returns_same_record() {
    let h = harness(AcadexConfig::default());
    let teacher = ctx("t-1", AccessSource::GradingUi);

    let first = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap();
    h.clock.advance(Duration::minutes(5));
    let second = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap();

    assert_eq!(second.submitted_at, first.submitted_at);
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_substitute_submits_and_is_logged() {
    let h = harness(AcadexConfig::default());
    let sub = ctx("sub-1", AccessSource::GradingUi);

    let record = h.mediator.submit_exam(&sub, &cc("cc-42")).await.unwrap();
    assert_eq!(record.submitted_by, Some(ProfileId::new("sub-1")));
    assert_eq!(h.access_log.count(), 1);
}

#[tokio::test]
async fn test_lock_by_delegate_other_than_submitter() {
    let h = harness(AcadexConfig::default());
    h.mediator
        .submit_exam(&ctx("t-1", AccessSource::GradingUi), &cc("cc-42"))
        .await
        .unwrap();
    h.mediator
        .approve_exam(&ctx("d-1", AccessSource::ExamWorkflow), &cc("cc-42"))
        .await
        .unwrap();

    let locked = h
        .mediator
        .lock_exam(&ctx("admin-1", AccessSource::AdminOverride), &cc("cc-42"))
        .await
        .unwrap();
    assert_eq!(locked.locked_by, Some(ProfileId::new("admin-1")));
}

#[tokio::test]
async fn test_stranger_is_denied_without_side_effects() {
    let h = harness(AcadexConfig::default());
    let err = h
        .mediator
        .submit_exam(&ctx("x-9", AccessSource::GradingUi), &cc("cc-42"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Unauthorized { .. }));
    assert_eq!(h.exams.count(), 0);
    assert_eq!(h.access_log.count(), 0);
}

#[tokio::test]
async fn test_joined_approvals_one_winner() {
    let h = harness(AcadexConfig::default());
    h.mediator
        .submit_exam(&ctx("t-1", AccessSource::GradingUi), &cc("cc-42"))
        .await
        .unwrap();

    let first = ctx("d-1", AccessSource::ExamWorkflow);
    let second = ctx("d-2", AccessSource::ExamWorkflow);
    let id_a = cc("cc-42");
    let id_b = cc("cc-42");
    let (a, b) = tokio::join!(
        h.mediator.approve_exam(&first, &id_a),
        h.mediator.approve_exam(&second, &id_b),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(DomainError::InvalidTransition {
            current: ExamStatus::Approved,
            ..
        })
    )));
    let stored = h
        .mediator
        .exam_record(&ctx("t-1", AccessSource::GradingUi), &cc("cc-42"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ExamStatus::Approved);
}

#[tokio::test]
async fn test_roster_policy_satisfied_by_auto_enrollment() {
    let config = AcadexConfig {
        workflow: WorkflowConfig {
            require_roster_for_submission: true,
            ..WorkflowConfig::default()
        },
        ..AcadexConfig::default()
    };
    let h = harness(config);
    let teacher = ctx("t-1", AccessSource::GradingUi);

    let err = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyRoster { .. }));

    h.mediator
        .open_window(
            &ctx("t-1", AccessSource::Enrollment),
            &class(),
            &year(),
            start(),
            start() + Duration::days(14),
        )
        .await
        .unwrap();
    h.mediator
        .auto_enroll(&ctx("t-1", AccessSource::Enrollment), &class(), &year())
        .await
        .unwrap();

    let record = h.mediator.submit_exam(&teacher, &cc("cc-42")).await.unwrap();
    assert_eq!(record.status, ExamStatus::Submitted);
}
