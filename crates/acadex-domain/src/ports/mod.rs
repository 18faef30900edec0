//! Port interfaces for external collaborators
//!
//! Ports define the contracts for systems this core does not own: identity
//! and role assignment, class rosters, the course catalog, and time.
//!
//! ## Modules
//!
//! - `capability`: owner/delegate resolution
//! - `roster`: class rosters and offered class-courses
//! - `clock`: current time source

pub mod capability;
pub mod clock;
pub mod roster;

pub use capability::*;
pub use clock::*;
pub use roster::*;
