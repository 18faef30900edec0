//! Roster and catalog ports

use async_trait::async_trait;

use crate::{
    errors::DomainResult,
    value_objects::{AcademicYearId, ClassCourseId, ClassId, ProfileId},
};

/// Authoritative list of a class's students
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Students of the class; ordering is not significant
    async fn list_students(&self, class_id: &ClassId) -> DomainResult<Vec<ProfileId>>;
}

/// Course offerings of a class
#[async_trait]
pub trait ClassCourseCatalog: Send + Sync {
    /// Class-courses offered to `class_id` during `academic_year_id`
    async fn class_courses_for(
        &self,
        class_id: &ClassId,
        academic_year_id: &AcademicYearId,
    ) -> DomainResult<Vec<ClassCourseId>>;
}
