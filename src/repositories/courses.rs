use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Course;
use crate::db::types::CourseStatus;

const COURSE_COLUMNS: &str = "id, title, description, term, syllabus, status, is_public, \
     professor_id, created_at, updated_at";

const QUALIFIED_COURSE_COLUMNS: &str = "c.id, c.title, c.description, c.term, c.syllabus, \
     c.status, c.is_public, c.professor_id, c.created_at, c.updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) term: &'a str,
    pub(crate) syllabus: &'a str,
    pub(crate) status: CourseStatus,
    pub(crate) is_public: bool,
    pub(crate) professor_id: Uuid,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) term: Option<String>,
    pub(crate) syllabus: Option<String>,
    pub(crate) status: Option<CourseStatus>,
    pub(crate) is_public: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Fields the access rules need, without loading the whole course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct CourseVisibility {
    pub(crate) is_public: bool,
    pub(crate) status: CourseStatus,
}

impl CourseVisibility {
    pub(crate) fn is_open_to_everyone(self) -> bool {
        self.is_public && self.status == CourseStatus::Published
    }
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, term, syllabus, status, is_public, professor_id,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.term)
    .bind(params.syllabus)
    .bind(params.status)
    .bind(params.is_public)
    .bind(params.professor_id)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: Uuid,
    params: UpdateCourse,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            term = COALESCE($3, term),
            syllabus = COALESCE($4, syllabus),
            status = COALESCE($5, status),
            is_public = COALESCE($6, is_public),
            updated_at = $7
         WHERE id = $8
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.term)
    .bind(params.syllabus)
    .bind(params.status)
    .bind(params.is_public)
    .bind(params.updated_at)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_taught_by(
    pool: &PgPool,
    professor_id: Uuid,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE professor_id = $1 ORDER BY created_at DESC",
    ))
    .bind(professor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_assisted_by(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {QUALIFIED_COURSE_COLUMNS}
         FROM courses c
         JOIN course_assistants ca ON ca.course_id = c.id
         WHERE ca.user_id = $1
         ORDER BY c.created_at DESC",
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Public published courses plus every course the student is enrolled in.
pub(crate) async fn list_visible_to_student(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {QUALIFIED_COURSE_COLUMNS}
         FROM courses c
         WHERE (c.is_public = TRUE AND c.status = $2)
            OR EXISTS (
                SELECT 1 FROM course_enrollments ce
                WHERE ce.course_id = c.id AND ce.user_id = $1
            )
         ORDER BY c.created_at DESC",
    ))
    .bind(user_id)
    .bind(CourseStatus::Published)
    .fetch_all(pool)
    .await
}

pub(crate) async fn is_taught_by(
    pool: &PgPool,
    course_id: Uuid,
    professor_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1 AND professor_id = $2)",
    )
    .bind(course_id)
    .bind(professor_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_visibility(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Option<CourseVisibility>, sqlx::Error> {
    sqlx::query_as::<_, CourseVisibility>("SELECT is_public, status FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_public_published_courses_are_open() {
        let open = CourseVisibility { is_public: true, status: CourseStatus::Published };
        let draft = CourseVisibility { is_public: true, status: CourseStatus::Draft };
        let private = CourseVisibility { is_public: false, status: CourseStatus::Published };

        assert!(open.is_open_to_everyone());
        assert!(!draft.is_open_to_everyone());
        assert!(!private.is_open_to_everyone());
    }
}
