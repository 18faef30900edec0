//! Acadex Domain Layer
//!
//! Core entities, lifecycle rules and port interfaces for the exam approval
//! workflow and the delegated-access audit ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  entities/        ExamRecord, AccessLogEntry,                 │
//! │                   EnrollmentWindow, EnrollmentRecord          │
//! │  repositories     ExamRecordRepository, AccessLogRepository,  │
//! │                   EnrollmentWindowRepository,                 │
//! │                   EnrollmentRecordRepository                  │
//! │  ports/           CapabilityResolver, RosterProvider,         │
//! │                   ClassCourseCatalog, Clock                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The domain defines only the contracts. Storage lives in
//! `acadex-persistence`, orchestration in `acadex-workflow`.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod repositories;
pub mod value_objects;

pub use entities::{
    AccessLogEntry, AccessSource, EnrollmentRecord, EnrollmentWindow, ExamAction, ExamRecord,
    ExamStatus, WindowStatus,
};
pub use errors::{DomainError, DomainResult};
pub use ports::{
    ActorRole, Capability, CapabilityResolver, ClassCourseCatalog, Clock, FixedClock,
    RosterProvider, SystemClock,
};
pub use repositories::{
    AccessLogRepository, EnrollmentRecordRepository, EnrollmentWindowRepository,
    ExamRecordRepository,
};
pub use value_objects::*;
