//! Access mediation
//!
//! Every request enters here. The mediator works out whether the actor owns
//! the resources or acts as a delegate, writes the ledger entries a delegate
//! access requires, and only then forwards to the target service.

use std::collections::HashSet;
use std::sync::Arc;

use acadex_domain::{
    AcademicYearId, AccessLogEntry, AccessSource, Capability, CapabilityResolver,
    ClassCourseCatalog, ClassCourseId, ClassId, DomainError, DomainResult, EnrollmentWindow,
    EnrollmentWindowId, ExamRecord, InstitutionId, ProfileId, WindowStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    enrollment::{EnrollmentSummary, EnrollmentWindowManager},
    exam::ExamWorkflow,
    ledger::AccessLedger,
    storage::StorageGuard,
};

/// Who is calling, on behalf of which institution, from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub actor: ProfileId,
    pub institution: InstitutionId,
    pub source: AccessSource,
}

impl ActorContext {
    pub fn new(
        actor: impl Into<ProfileId>,
        institution: impl Into<InstitutionId>,
        source: AccessSource,
    ) -> Self {
        Self {
            actor: actor.into(),
            institution: institution.into(),
            source,
        }
    }
}

/// Granted access to a set of class-courses
///
/// Only the mediator creates decisions. Holding one means that, if the
/// actor is a delegate, the ledger already holds an entry for every
/// covered class-course.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    actor: ProfileId,
    institution: InstitutionId,
    capability: Capability,
    class_course_ids: Vec<ClassCourseId>,
    class_id: Option<ClassId>,
    source: AccessSource,
}

impl AccessDecision {
    pub(crate) fn granted(
        actor: ProfileId,
        institution: InstitutionId,
        capability: Capability,
        class_course_ids: Vec<ClassCourseId>,
        source: AccessSource,
    ) -> Self {
        Self {
            actor,
            institution,
            capability,
            class_course_ids,
            class_id: None,
            source,
        }
    }

    pub(crate) fn for_class(mut self, class_id: ClassId) -> Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn actor(&self) -> &ProfileId {
        &self.actor
    }

    pub fn institution(&self) -> &InstitutionId {
        &self.institution
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn is_delegate(&self) -> bool {
        self.capability.is_delegate()
    }

    pub fn source(&self) -> AccessSource {
        self.source
    }

    pub fn class_course_ids(&self) -> &[ClassCourseId] {
        &self.class_course_ids
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        self.class_id.as_ref()
    }

    pub fn covers(&self, class_course_id: &ClassCourseId) -> bool {
        self.class_course_ids.contains(class_course_id)
    }

    pub(crate) fn ensure_covers(&self, class_course_id: &ClassCourseId) -> DomainResult<()> {
        if self.covers(class_course_id) {
            return Ok(());
        }
        Err(DomainError::unauthorized(
            self.actor.as_str(),
            format!("access to {} was not authorized", class_course_id),
        ))
    }

    pub(crate) fn ensure_covers_class(&self, class_id: &ClassId) -> DomainResult<()> {
        if self.class_id.as_ref() == Some(class_id) {
            return Ok(());
        }
        Err(DomainError::unauthorized(
            self.actor.as_str(),
            format!("access to class {} was not authorized", class_id),
        ))
    }
}

/// Single entry point for exam and enrollment operations
pub struct AccessMediator {
    resolver: Arc<dyn CapabilityResolver>,
    catalog: Arc<dyn ClassCourseCatalog>,
    ledger: Arc<AccessLedger>,
    exams: Arc<ExamWorkflow>,
    enrollment: Arc<EnrollmentWindowManager>,
    storage: StorageGuard,
}

impl AccessMediator {
    pub fn new(
        resolver: Arc<dyn CapabilityResolver>,
        catalog: Arc<dyn ClassCourseCatalog>,
        ledger: Arc<AccessLedger>,
        exams: Arc<ExamWorkflow>,
        enrollment: Arc<EnrollmentWindowManager>,
        storage: StorageGuard,
    ) -> Self {
        Self {
            resolver,
            catalog,
            ledger,
            exams,
            enrollment,
            storage,
        }
    }

    pub fn ledger(&self) -> &AccessLedger {
        &self.ledger
    }

    /// Authorize access to a set of class-courses
    ///
    /// Any class-course the actor has no capability over denies the whole
    /// request. Owning every class-course yields an owner decision; otherwise
    /// the actor is a delegate and the ledger is written before the decision
    /// is returned. A ledger failure denies access.
    pub async fn authorize(
        &self,
        ctx: &ActorContext,
        class_course_ids: &[ClassCourseId],
    ) -> DomainResult<AccessDecision> {
        let ids = distinct(class_course_ids);
        if ids.is_empty() {
            return Err(DomainError::ValidationError {
                field: "class_course_ids".to_string(),
                reason: "at least one class-course is required".to_string(),
            });
        }

        let mut capability = Capability::Owner;
        for id in &ids {
            let resolved = self
                .storage
                .run("resolve_capability", self.resolver.resolve_capability(&ctx.actor, id))
                .await?;
            capability = combine(&ctx.actor, id.as_str(), capability, resolved)
                .inspect_err(|_| warn!(actor = %ctx.actor, resource = %id, "access denied"))?;
        }

        self.grant(ctx, capability, ids).await
    }

    /// Authorize a class-level operation
    ///
    /// Delegate access is logged against every class-course the class is
    /// offered in `academic_year_id`.
    pub async fn authorize_class(
        &self,
        ctx: &ActorContext,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<AccessDecision> {
        let resolved = self
            .storage
            .run(
                "resolve_class_capability",
                self.resolver.resolve_class_capability(&ctx.actor, class_id),
            )
            .await?;
        let capability = combine(&ctx.actor, class_id.as_str(), Capability::Owner, resolved)
            .inspect_err(|_| {
                warn!(actor = %ctx.actor, class_id = %class_id, "class access denied")
            })?;

        let offered = self
            .storage
            .run(
                "class_courses_for",
                self.catalog.class_courses_for(class_id, academic_year_id),
            )
            .await?;

        let decision = self.grant(ctx, capability, distinct(&offered)).await?;
        Ok(decision.for_class(class_id.clone()))
    }

    async fn grant(
        &self,
        ctx: &ActorContext,
        capability: Capability,
        ids: Vec<ClassCourseId>,
    ) -> DomainResult<AccessDecision> {
        if capability.is_delegate() {
            if ids.is_empty() {
                warn!(
                    actor = %ctx.actor,
                    institution = %ctx.institution,
                    "delegated access denied: no class-course to audit against"
                );
                return Err(DomainError::unauthorized(
                    ctx.actor.as_str(),
                    "delegated access has no class-course to audit against",
                ));
            }
            if let Err(err) = self
                .ledger
                .record(&ids, &ctx.actor, &ctx.institution, ctx.source)
                .await
            {
                warn!(
                    actor = %ctx.actor,
                    institution = %ctx.institution,
                    error = %err,
                    "delegated access denied: audit entry could not be written"
                );
                return Err(DomainError::unauthorized(
                    ctx.actor.as_str(),
                    format!("access audit could not be recorded: {}", err),
                ));
            }
        }

        debug!(
            actor = %ctx.actor,
            capability = ?capability,
            resources = ids.len(),
            "access granted"
        );
        Ok(AccessDecision::granted(
            ctx.actor.clone(),
            ctx.institution.clone(),
            capability,
            ids,
            ctx.source,
        ))
    }

    pub async fn submit_exam(
        &self,
        ctx: &ActorContext,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        let decision = self.authorize(ctx, std::slice::from_ref(class_course_id)).await?;
        self.exams.submit(&decision, class_course_id).await
    }

    pub async fn approve_exam(
        &self,
        ctx: &ActorContext,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        let decision = self.authorize(ctx, std::slice::from_ref(class_course_id)).await?;
        self.exams.approve(&decision, class_course_id).await
    }

    pub async fn lock_exam(
        &self,
        ctx: &ActorContext,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<ExamRecord> {
        let decision = self.authorize(ctx, std::slice::from_ref(class_course_id)).await?;
        self.exams.lock(&decision, class_course_id).await
    }

    /// Read an exam record; delegate reads are logged like writes
    pub async fn exam_record(
        &self,
        ctx: &ActorContext,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Option<ExamRecord>> {
        self.authorize(ctx, std::slice::from_ref(class_course_id)).await?;
        self.exams.current(class_course_id).await
    }

    /// Delegated accesses recorded for a class-course, oldest first
    pub async fn access_history(
        &self,
        ctx: &ActorContext,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Vec<AccessLogEntry>> {
        self.authorize(ctx, std::slice::from_ref(class_course_id)).await?;
        self.ledger.entries_for_class_course(class_course_id).await
    }

    pub async fn auto_enroll(
        &self,
        ctx: &ActorContext,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<EnrollmentSummary> {
        let decision = self.authorize_class(ctx, class_id, academic_year_id).await?;
        self.enrollment
            .auto_enroll(&decision, class_id, academic_year_id)
            .await
    }

    pub async fn open_window(
        &self,
        ctx: &ActorContext,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> DomainResult<EnrollmentWindow> {
        let decision = self.authorize_class(ctx, class_id, academic_year_id).await?;
        self.enrollment
            .open_window(&decision, class_id, academic_year_id, opens_at, closes_at)
            .await
    }

    pub async fn force_close_window(
        &self,
        ctx: &ActorContext,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<EnrollmentWindow> {
        let decision = self.authorize_window(ctx, window_id).await?;
        self.enrollment.force_close(&decision, window_id).await
    }

    pub async fn window_status(
        &self,
        ctx: &ActorContext,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<WindowStatus> {
        self.authorize_window(ctx, window_id).await?;
        self.enrollment.window_status(window_id).await
    }

    /// Authorize against the class a window belongs to
    ///
    /// An unknown window and a window the actor may not touch are reported
    /// with the same error.
    async fn authorize_window(
        &self,
        ctx: &ActorContext,
        window_id: &EnrollmentWindowId,
    ) -> DomainResult<AccessDecision> {
        let denied = || {
            DomainError::unauthorized(
                ctx.actor.as_str(),
                format!("access to enrollment window {} was not authorized", window_id),
            )
        };

        let Some(window) = self.enrollment.find_window(window_id).await? else {
            warn!(actor = %ctx.actor, window_id = %window_id, "enrollment window access denied");
            return Err(denied());
        };
        match self
            .authorize_class(ctx, &window.class_id, &window.academic_year_id)
            .await
        {
            Err(DomainError::Unauthorized { .. }) => Err(denied()),
            other => other,
        }
    }
}

/// Fold one resource's capability into the running result
fn combine(
    actor: &ProfileId,
    resource: &str,
    current: Capability,
    resolved: Capability,
) -> DomainResult<Capability> {
    match (current, resolved) {
        (_, Capability::None) => Err(DomainError::unauthorized(
            actor.as_str(),
            format!("no ownership or delegation over {}", resource),
        )),
        (Capability::Delegate(role), _) => Ok(Capability::Delegate(role)),
        (_, resolved) => Ok(resolved),
    }
}

/// Drop repeated ids, keeping first occurrence order
fn distinct(ids: &[ClassCourseId]) -> Vec<ClassCourseId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}
