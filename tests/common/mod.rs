//! Shared harness for the end-to-end tests

#![allow(dead_code)]

use std::sync::Arc;

use acadex_config::AcadexConfig;
use acadex_domain::{
    AcademicYearId, AccessSource, ActorRole, ClassCourseId, ClassId, FixedClock, ProfileId,
};
use acadex_persistence::{
    InMemoryAccessLogRepository, InMemoryDirectory, InMemoryEnrollmentRecordRepository,
    InMemoryEnrollmentWindowRepository, InMemoryExamRecordRepository,
};
use acadex_workflow::{AccessMediator, ActorContext, Collaborators, Repositories};
use chrono::{DateTime, TimeZone, Utc};

pub const INSTITUTION: &str = "inst-1";
pub const CLASS: &str = "class-7a";
pub const YEAR: &str = "2026-2027";

pub struct Harness {
    pub mediator: AccessMediator,
    pub directory: Arc<InMemoryDirectory>,
    pub exams: Arc<InMemoryExamRecordRepository>,
    pub access_log: Arc<InMemoryAccessLogRepository>,
    pub enrollments: Arc<InMemoryEnrollmentRecordRepository>,
    pub clock: Arc<FixedClock>,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
}

pub fn cc(id: &str) -> ClassCourseId {
    ClassCourseId::new(id)
}

pub fn class() -> ClassId {
    ClassId::new(CLASS)
}

pub fn year() -> AcademicYearId {
    AcademicYearId::new(YEAR)
}

pub fn ctx(actor: &str, source: AccessSource) -> ActorContext {
    ActorContext::new(actor, INSTITUTION, source)
}

/// Class 7a takes cc-42 (taught by t-1) and cc-43 (taught by t-2).
/// t-1 is also the homeroom teacher. sub-1 substitutes on cc-42, d-1 is a
/// dean, admin-1 an administrator. Three students are rostered.
pub fn harness(config: AcadexConfig) -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.assign_teacher(&cc("cc-42"), &ProfileId::new("t-1"));
    directory.assign_teacher(&cc("cc-43"), &ProfileId::new("t-2"));
    directory.assign_homeroom(&class(), &ProfileId::new("t-1"));
    directory.assign_substitute(&cc("cc-42"), &ProfileId::new("sub-1"));
    directory.grant_role(&ProfileId::new("d-1"), ActorRole::Dean);
    directory.grant_role(&ProfileId::new("d-2"), ActorRole::Dean);
    directory.grant_role(&ProfileId::new("admin-1"), ActorRole::Administrator);
    directory.offer(&class(), &year(), &cc("cc-42"));
    directory.offer(&class(), &year(), &cc("cc-43"));
    directory.set_roster(
        &class(),
        vec![ProfileId::new("s-1"), ProfileId::new("s-2"), ProfileId::new("s-3")],
    );

    let exams = Arc::new(InMemoryExamRecordRepository::new());
    let access_log = Arc::new(InMemoryAccessLogRepository::new());
    let enrollments = Arc::new(InMemoryEnrollmentRecordRepository::new());
    let clock = Arc::new(FixedClock::new(start()));

    let mediator = AccessMediator::from_parts(
        &config,
        Repositories {
            exams: exams.clone(),
            access_log: access_log.clone(),
            windows: Arc::new(InMemoryEnrollmentWindowRepository::new()),
            enrollments: enrollments.clone(),
        },
        Collaborators {
            resolver: directory.clone(),
            roster: directory.clone(),
            catalog: directory.clone(),
            clock: clock.clone(),
        },
    );

    Harness {
        mediator,
        directory,
        exams,
        access_log,
        enrollments,
        clock,
    }
}
