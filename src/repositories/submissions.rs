use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Submission;

const COLUMNS: &str = "id, assignment_id, user_id, content, file_path, submitted_at, is_late, \
     grade, feedback, graded_by, graded_at";

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: Uuid,
    pub(crate) assignment_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) content: &'a str,
    pub(crate) file_path: Option<&'a str>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) is_late: bool,
}

pub(crate) struct GradeSubmission<'a> {
    pub(crate) grade: f64,
    pub(crate) feedback: Option<&'a str>,
    pub(crate) graded_by: Uuid,
    pub(crate) graded_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, assignment_id, user_id, content, file_path, submitted_at, is_late
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.assignment_id)
    .bind(params.user_id)
    .bind(params.content)
    .bind(params.file_path)
    .bind(params.submitted_at)
    .bind(params.is_late)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(submission_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_assignment(
    pool: &PgPool,
    assignment_id: Uuid,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE assignment_id = $1 ORDER BY submitted_at ASC",
    ))
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

/// Course that owns the submission's assignment.
pub(crate) async fn find_course_id(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT a.course_id
         FROM submissions s
         JOIN assignments a ON a.id = s.assignment_id
         WHERE s.id = $1",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn grade(
    pool: &PgPool,
    submission_id: Uuid,
    params: GradeSubmission<'_>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "UPDATE submissions SET
            grade = $1,
            feedback = $2,
            graded_by = $3,
            graded_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.grade)
    .bind(params.feedback)
    .bind(params.graded_by)
    .bind(params.graded_at)
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}
