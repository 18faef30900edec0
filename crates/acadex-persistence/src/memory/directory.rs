//! In-Memory Directory
//!
//! Stands in for the identity, roster and catalog services this core only
//! consumes. Memory backend for tests and embedding.

use std::collections::{HashMap, HashSet};

use acadex_domain::{
    AcademicYearId, ActorRole, Capability, CapabilityResolver, ClassCourseCatalog, ClassCourseId,
    ClassId, DomainResult, ProfileId, RosterProvider,
};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::Availability;

#[derive(Debug, Default)]
struct DirectoryData {
    class_course_owners: HashMap<ClassCourseId, ProfileId>,
    class_owners: HashMap<ClassId, ProfileId>,
    substitutes: HashMap<ClassCourseId, HashSet<ProfileId>>,
    institution_roles: HashMap<ProfileId, ActorRole>,
    rosters: HashMap<ClassId, Vec<ProfileId>>,
    offerings: HashMap<(ClassId, AcademicYearId), Vec<ClassCourseId>>,
}

/// In-memory identity, roster and catalog directory
///
/// Resolution order for a class-course: teacher of record → owner;
/// assigned substitute → delegate(substitute); institution-wide
/// administrator or dean → delegate(role); anyone else → none.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: RwLock<DirectoryData>,
    availability: Availability,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable directory
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Make `teacher` the teacher of record of a class-course
    pub fn assign_teacher(&self, class_course_id: &ClassCourseId, teacher: &ProfileId) {
        self.data
            .write()
            .class_course_owners
            .insert(class_course_id.clone(), teacher.clone());
    }

    /// Make `teacher` the homeroom owner of a class
    pub fn assign_homeroom(&self, class_id: &ClassId, teacher: &ProfileId) {
        self.data
            .write()
            .class_owners
            .insert(class_id.clone(), teacher.clone());
    }

    pub fn assign_substitute(&self, class_course_id: &ClassCourseId, substitute: &ProfileId) {
        self.data
            .write()
            .substitutes
            .entry(class_course_id.clone())
            .or_default()
            .insert(substitute.clone());
    }

    /// Grant an institution-wide role (administrator, dean)
    pub fn grant_role(&self, profile_id: &ProfileId, role: ActorRole) {
        self.data
            .write()
            .institution_roles
            .insert(profile_id.clone(), role);
    }

    pub fn set_roster(&self, class_id: &ClassId, students: Vec<ProfileId>) {
        self.data.write().rosters.insert(class_id.clone(), students);
    }

    pub fn add_student(&self, class_id: &ClassId, student: &ProfileId) {
        self.data
            .write()
            .rosters
            .entry(class_id.clone())
            .or_default()
            .push(student.clone());
    }

    /// Offer a class-course to a class for an academic year
    pub fn offer(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
        class_course_id: &ClassCourseId,
    ) {
        self.data
            .write()
            .offerings
            .entry((class_id.clone(), academic_year_id.clone()))
            .or_default()
            .push(class_course_id.clone());
    }

    fn institution_capability(data: &DirectoryData, profile_id: &ProfileId) -> Capability {
        match data.institution_roles.get(profile_id) {
            Some(role @ (ActorRole::Administrator | ActorRole::Dean)) => {
                Capability::Delegate(*role)
            }
            _ => Capability::None,
        }
    }
}

#[async_trait]
impl CapabilityResolver for InMemoryDirectory {
    async fn resolve_capability(
        &self,
        profile_id: &ProfileId,
        class_course_id: &ClassCourseId,
    ) -> DomainResult<Capability> {
        self.availability
            .check("directory")
            .map_err(|e| e.during("resolve_capability"))?;
        let data = self.data.read();
        if data.class_course_owners.get(class_course_id) == Some(profile_id) {
            return Ok(Capability::Owner);
        }
        let is_substitute = data
            .substitutes
            .get(class_course_id)
            .is_some_and(|subs| subs.contains(profile_id));
        if is_substitute {
            return Ok(Capability::Delegate(ActorRole::Substitute));
        }
        Ok(Self::institution_capability(&data, profile_id))
    }

    async fn resolve_class_capability(
        &self,
        profile_id: &ProfileId,
        class_id: &ClassId,
    ) -> DomainResult<Capability> {
        self.availability
            .check("directory")
            .map_err(|e| e.during("resolve_class_capability"))?;
        let data = self.data.read();
        if data.class_owners.get(class_id) == Some(profile_id) {
            return Ok(Capability::Owner);
        }
        Ok(Self::institution_capability(&data, profile_id))
    }
}

#[async_trait]
impl RosterProvider for InMemoryDirectory {
    async fn list_students(&self, class_id: &ClassId) -> DomainResult<Vec<ProfileId>> {
        self.availability
            .check("directory")
            .map_err(|e| e.during("list_students"))?;
        Ok(self
            .data
            .read()
            .rosters
            .get(class_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ClassCourseCatalog for InMemoryDirectory {
    async fn class_courses_for(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<Vec<ClassCourseId>> {
        self.availability
            .check("directory")
            .map_err(|e| e.during("class_courses_for"))?;
        Ok(self
            .data
            .read()
            .offerings
            .get(&(class_id.clone(), academic_year_id.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
