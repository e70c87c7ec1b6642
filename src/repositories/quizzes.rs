use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Quiz;

const COLUMNS: &str = "id, course_id, title, description, due_date, time_limit, attempts, \
     points_value, visible_from, visible_to, created_at, updated_at";

pub(crate) struct CreateQuiz<'a> {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: PrimitiveDateTime,
    pub(crate) time_limit: i32,
    pub(crate) attempts: i32,
    pub(crate) points_value: f64,
    pub(crate) visible_from: Option<PrimitiveDateTime>,
    pub(crate) visible_to: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateQuiz {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) time_limit: Option<i32>,
    pub(crate) attempts: Option<i32>,
    pub(crate) points_value: Option<f64>,
    pub(crate) visible_from: Option<PrimitiveDateTime>,
    pub(crate) visible_to: Option<PrimitiveDateTime>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateQuiz<'_>) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, course_id, title, description, due_date, time_limit, attempts, points_value,
            visible_from, visible_to, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$11)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.time_limit)
    .bind(params.attempts)
    .bind(params.points_value)
    .bind(params.visible_from)
    .bind(params.visible_to)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, quiz_id: Uuid) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE course_id = $1 ORDER BY due_date ASC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    quiz_id: Uuid,
    params: UpdateQuiz,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "UPDATE quizzes SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            due_date = COALESCE($3, due_date),
            time_limit = COALESCE($4, time_limit),
            attempts = COALESCE($5, attempts),
            points_value = COALESCE($6, points_value),
            visible_from = COALESCE($7, visible_from),
            visible_to = COALESCE($8, visible_to),
            updated_at = $9
         WHERE id = $10
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.time_limit)
    .bind(params.attempts)
    .bind(params.points_value)
    .bind(params.visible_from)
    .bind(params.visible_to)
    .bind(params.updated_at)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, quiz_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1").bind(quiz_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
