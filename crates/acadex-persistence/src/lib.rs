//! Acadex Persistence Layer
//!
//! Infrastructure layer providing repository implementations for the domain
//! aggregates. This crate implements the repository interfaces defined in
//! `acadex-domain`.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                      │
//! ├───────────────────────────────────────────────────────────┤
//! │  memory/                                                   │
//! │  InMemoryExamRecordRepository      (compare-and-set)       │
//! │  InMemoryAccessLogRepository       (atomic batch append)   │
//! │  InMemoryEnrollmentWindowRepository                        │
//! │  InMemoryEnrollmentRecordRepository (atomic insert-missing)│
//! │  InMemoryDirectory   (capability, roster, catalog ports)   │
//! └───────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ implements
//!                              ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Domain Layer                          │
//! │  ExamRecordRepository, AccessLogRepository,                │
//! │  EnrollmentWindowRepository, EnrollmentRecordRepository    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use acadex_persistence::memory::InMemoryExamRecordRepository;
//! use acadex_domain::ExamRecordRepository;
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn ExamRecordRepository> = Arc::new(InMemoryExamRecordRepository::new());
//! ```

pub mod error;
#[cfg(feature = "memory")]
pub mod memory;

pub use error::PersistenceError;

#[cfg(feature = "memory")]
pub use memory::{
    InMemoryAccessLogRepository, InMemoryDirectory, InMemoryEnrollmentRecordRepository,
    InMemoryEnrollmentWindowRepository, InMemoryExamRecordRepository,
};
