//! Acadex Exam Workflow and Delegated-Access Auditing
//!
//! Services that sit between the RPC layer and storage:
//!
//! - [`AccessLedger`]: append-only log of delegated accesses
//! - [`ExamWorkflow`]: role-gated `draft → submitted → approved → locked` lifecycle
//! - [`EnrollmentWindowManager`]: enrollment windows and bulk auto-enrollment
//! - [`AccessMediator`]: the entry point every request passes through
//!
//! ## Control flow
//!
//! ```text
//! caller ──► AccessMediator ──(delegate)──► AccessLedger.record()
//!                  │
//!                  └──► ExamWorkflow / EnrollmentWindowManager ──► result
//! ```
//!
//! An [`AccessDecision`] can only be minted by the mediator, so the workflow
//! and enrollment services cannot be driven by a delegate whose access was not
//! logged first.
//!
//! ## Usage
//!
//! ```ignore
//! use acadex_workflow::{ActorContext, AccessMediator, Collaborators, Repositories};
//!
//! let mediator = AccessMediator::from_parts(&config, repositories, collaborators);
//! let ctx = ActorContext::new("t-1", "inst-1", AccessSource::GradingUi);
//! let record = mediator.submit_exam(&ctx, &ClassCourseId::new("cc-42")).await?;
//! ```

pub mod enrollment;
pub mod exam;
pub mod ledger;
pub mod mediator;
pub mod storage;
pub mod wiring;

pub use enrollment::{EnrollmentSummary, EnrollmentWindowManager};
pub use exam::ExamWorkflow;
pub use ledger::AccessLedger;
pub use mediator::{AccessDecision, AccessMediator, ActorContext};
pub use storage::StorageGuard;
pub use wiring::{Collaborators, Repositories};
