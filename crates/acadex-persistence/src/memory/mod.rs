//! In-Memory Repository Implementations
//!
//! Thread-safe in-memory implementations of domain repository interfaces.
//! Each conditional or batch write happens under a single write guard, which
//! gives the same atomicity a relational store gives the production backend.
//!
//! Every repository can be switched offline to simulate an unreachable store.

mod access_log_repository;
mod directory;
mod enrollment_repository;
mod exam_record_repository;

use std::sync::atomic::{AtomicBool, Ordering};

pub use access_log_repository::InMemoryAccessLogRepository;
pub use directory::InMemoryDirectory;
pub use enrollment_repository::{
    InMemoryEnrollmentRecordRepository, InMemoryEnrollmentWindowRepository,
};
pub use exam_record_repository::InMemoryExamRecordRepository;

use crate::error::PersistenceError;

/// Availability flag shared by the in-memory repositories
#[derive(Debug, Default)]
struct Availability {
    offline: AtomicBool,
}

impl Availability {
    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> Result<(), PersistenceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::Connection(format!("{} is offline", store)));
        }
        Ok(())
    }
}
