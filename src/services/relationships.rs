//! Course relationship checks: is a user the professor, a teaching assistant or an
//! enrolled student of a course.
//!
//! The user's account role decides which relationship is even considered, so a
//! professor is never "enrolled" and a student is never "staff", whatever rows exist.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::courses::CourseVisibility;

/// The identity a relationship check is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Principal {
    pub(crate) id: Uuid,
    pub(crate) role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role }
    }
}

/// Read-only view of users and course relationship facts.
#[async_trait]
pub(crate) trait CourseDirectory: Send + Sync {
    async fn find_principal(&self, user_id: Uuid) -> Result<Option<Principal>, sqlx::Error>;

    async fn is_course_professor(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn count_ta_assignments(&self, course_id: Uuid, user_id: Uuid)
        -> Result<i64, sqlx::Error>;

    async fn count_enrollments(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, sqlx::Error>;

    async fn find_course_visibility(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseVisibility>, sqlx::Error>;
}

pub(crate) struct PgCourseDirectory {
    pool: PgPool,
}

impl PgCourseDirectory {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseDirectory for PgCourseDirectory {
    async fn find_principal(&self, user_id: Uuid) -> Result<Option<Principal>, sqlx::Error> {
        let role = repositories::users::find_role_by_id(&self.pool, user_id).await?;
        Ok(role.map(|role| Principal { id: user_id, role }))
    }

    async fn is_course_professor(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        repositories::courses::is_taught_by(&self.pool, course_id, user_id).await
    }

    async fn count_ta_assignments(
        &self,
        course_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        repositories::course_assistants::count_for(&self.pool, course_id, user_id).await
    }

    async fn count_enrollments(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, sqlx::Error> {
        repositories::enrollments::count_for(&self.pool, course_id, user_id).await
    }

    async fn find_course_visibility(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseVisibility>, sqlx::Error> {
        repositories::courses::find_visibility(&self.pool, course_id).await
    }
}

/// Answers relationship questions against a [`CourseDirectory`].
///
/// Lookup failures are logged and answered with `false`, so a broken datastore can
/// only ever deny access.
#[derive(Clone, Copy)]
pub(crate) struct RelationshipResolver<'a> {
    directory: &'a dyn CourseDirectory,
}

impl<'a> RelationshipResolver<'a> {
    pub(crate) fn new(directory: &'a dyn CourseDirectory) -> Self {
        Self { directory }
    }

    pub(crate) async fn is_professor_of(&self, principal: &Principal, course_id: Uuid) -> bool {
        match principal.role {
            UserRole::Professor => {}
            UserRole::Ta | UserRole::Student => return false,
        }

        self.directory
            .is_course_professor(course_id, principal.id)
            .await
            .unwrap_or_else(|err| deny(err, "professor", principal, course_id))
    }

    pub(crate) async fn is_ta_of(&self, principal: &Principal, course_id: Uuid) -> bool {
        match principal.role {
            UserRole::Ta => {}
            UserRole::Professor | UserRole::Student => return false,
        }

        match self.directory.count_ta_assignments(course_id, principal.id).await {
            Ok(count) => count > 0,
            Err(err) => deny(err, "ta", principal, course_id),
        }
    }

    pub(crate) async fn is_enrolled_in(&self, principal: &Principal, course_id: Uuid) -> bool {
        match principal.role {
            UserRole::Student => {}
            UserRole::Professor | UserRole::Ta => return false,
        }

        match self.directory.count_enrollments(course_id, principal.id).await {
            Ok(count) => count > 0,
            Err(err) => deny(err, "enrollment", principal, course_id),
        }
    }

    /// Professor of the course, or one of its teaching assistants.
    pub(crate) async fn is_course_staff(&self, principal: &Principal, course_id: Uuid) -> bool {
        self.is_professor_of(principal, course_id).await
            || self.is_ta_of(principal, course_id).await
    }

    /// Staff, enrolled students, and everyone for public published courses.
    pub(crate) async fn has_course_access(&self, principal: &Principal, course_id: Uuid) -> bool {
        if self.is_course_staff(principal, course_id).await
            || self.is_enrolled_in(principal, course_id).await
        {
            return true;
        }

        match self.directory.find_course_visibility(course_id).await {
            Ok(visibility) => visibility.is_some_and(CourseVisibility::is_open_to_everyone),
            Err(err) => deny(err, "visibility", principal, course_id),
        }
    }
}

fn deny(err: sqlx::Error, relation: &'static str, principal: &Principal, course_id: Uuid) -> bool {
    tracing::error!(
        error = %err,
        relation,
        user_id = %principal.id,
        course_id = %course_id,
        "Relationship lookup failed; denying"
    );
    false
}
