//! Composition root
//!
//! Builds the services from configuration and the storage and collaborator
//! implementations the embedding application provides.

use std::sync::Arc;

use acadex_config::AcadexConfig;
use acadex_domain::{
    AccessLogRepository, CapabilityResolver, ClassCourseCatalog, Clock, EnrollmentRecordRepository,
    EnrollmentWindowRepository, ExamRecordRepository, RosterProvider,
};
use tracing::debug;

use crate::{
    enrollment::EnrollmentWindowManager, exam::ExamWorkflow, ledger::AccessLedger,
    mediator::AccessMediator, storage::StorageGuard,
};

/// Storage owned by this core
#[derive(Clone)]
pub struct Repositories {
    pub exams: Arc<dyn ExamRecordRepository>,
    pub access_log: Arc<dyn AccessLogRepository>,
    pub windows: Arc<dyn EnrollmentWindowRepository>,
    pub enrollments: Arc<dyn EnrollmentRecordRepository>,
}

/// External services this core consumes
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn CapabilityResolver>,
    pub roster: Arc<dyn RosterProvider>,
    pub catalog: Arc<dyn ClassCourseCatalog>,
    pub clock: Arc<dyn Clock>,
}

impl AccessMediator {
    /// Wire the ledger, workflow and enrollment manager behind a mediator
    pub fn from_parts(
        config: &AcadexConfig,
        repositories: Repositories,
        collaborators: Collaborators,
    ) -> Self {
        let storage = StorageGuard::from_config(&config.storage);
        debug!(
            timeout_ms = config.storage.timeout_ms,
            require_roster = config.workflow.require_roster_for_submission,
            allow_self_approval = config.workflow.allow_self_approval,
            "wiring access mediator"
        );

        let ledger = Arc::new(AccessLedger::new(
            repositories.access_log,
            collaborators.clock.clone(),
            storage,
        ));
        let exams = Arc::new(ExamWorkflow::new(
            repositories.exams,
            repositories.enrollments.clone(),
            collaborators.clock.clone(),
            storage,
            config.workflow.clone(),
        ));
        let enrollment = Arc::new(EnrollmentWindowManager::new(
            repositories.windows,
            repositories.enrollments,
            collaborators.roster,
            collaborators.catalog.clone(),
            collaborators.clock,
            storage,
        ));

        AccessMediator::new(
            collaborators.resolver,
            collaborators.catalog,
            ledger,
            exams,
            enrollment,
            storage,
        )
    }
}
