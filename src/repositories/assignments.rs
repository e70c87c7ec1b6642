use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Assignment;

const COLUMNS: &str = "id, course_id, title, description, due_date, points_value, \
     submission_type, allow_late, late_penalty, created_at, updated_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: PrimitiveDateTime,
    pub(crate) points_value: f64,
    pub(crate) submission_type: &'a str,
    pub(crate) allow_late: bool,
    pub(crate) late_penalty: f64,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateAssignment {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) points_value: Option<f64>,
    pub(crate) submission_type: Option<String>,
    pub(crate) allow_late: Option<bool>,
    pub(crate) late_penalty: Option<f64>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (
            id, course_id, title, description, due_date, points_value, submission_type,
            allow_late, late_penalty, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$10)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.points_value)
    .bind(params.submission_type)
    .bind(params.allow_late)
    .bind(params.late_penalty)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    assignment_id: Uuid,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
        .bind(assignment_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments WHERE course_id = $1 ORDER BY due_date ASC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    assignment_id: Uuid,
    params: UpdateAssignment,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "UPDATE assignments SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            due_date = COALESCE($3, due_date),
            points_value = COALESCE($4, points_value),
            submission_type = COALESCE($5, submission_type),
            allow_late = COALESCE($6, allow_late),
            late_penalty = COALESCE($7, late_penalty),
            updated_at = $8
         WHERE id = $9
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.points_value)
    .bind(params.submission_type)
    .bind(params.allow_late)
    .bind(params.late_penalty)
    .bind(params.updated_at)
    .bind(assignment_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, assignment_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
