//! Capability resolution port
//!
//! Ownership and role checks all go through one interface returning a tagged
//! result, so the workflow and the enrollment manager gate on the same answer.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainResult,
    value_objects::{ClassCourseId, ClassId, ProfileId},
};

/// Role an actor holds when acting on a resource they do not own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Another teacher of the institution
    Teacher,
    /// Substitute instructor assigned to the class-course
    Substitute,
    Administrator,
    /// Dean-level approver
    Dean,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorRole::Teacher => "teacher",
            ActorRole::Substitute => "substitute",
            ActorRole::Administrator => "administrator",
            ActorRole::Dean => "dean",
        };
        f.write_str(name)
    }
}

/// What an actor may do with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "lowercase")]
pub enum Capability {
    /// Teacher of record
    Owner,
    /// Acting on someone else's resource; every access is audited
    Delegate(ActorRole),
    /// No relationship to the resource
    None,
}

impl Capability {
    pub fn is_owner(&self) -> bool {
        matches!(self, Capability::Owner)
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self, Capability::Delegate(_))
    }

    /// Delegate role, if any
    pub fn role(&self) -> Option<ActorRole> {
        match self {
            Capability::Delegate(role) => Some(*role),
            _ => None,
        }
    }
}

/// Resolves an actor's capability over class-courses and classes
#[async_trait]
pub trait CapabilityResolver: Send + Sync {
    /// Capability of `profile_id` over one class-course
    async fn resolve_capability(
        &self,
        profile_id: &ProfileId,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Capability>;

    /// Capability of `profile_id` over a whole class (homeroom ownership)
    async fn resolve_class_capability(
        &self,
        profile_id: &ProfileId,
        class_id: &ClassId,
    ) -> DomainResult<Capability>;
}
