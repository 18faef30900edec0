//! Domain entities
//!
//! - `exam_record`: per class-course exam record and its lifecycle
//! - `access_log`: append-only delegated-access entries
//! - `enrollment`: enrollment windows and the records auto-enrollment creates

mod access_log;
mod enrollment;
mod exam_record;

pub use access_log::{AccessLogEntry, AccessSource};
pub use enrollment::{EnrollmentRecord, EnrollmentWindow, WindowStatus};
pub use exam_record::{ExamAction, ExamRecord, ExamStatus};
