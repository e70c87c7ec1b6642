use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Announcement;

const COLUMNS: &str = "id, course_id, publisher_id, title, content, created_at";

pub(crate) struct CreateAnnouncement<'a> {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) publisher_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAnnouncement<'_>,
) -> Result<Announcement, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "INSERT INTO announcements (id, course_id, publisher_id, title, content, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.publisher_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {COLUMNS} FROM announcements WHERE course_id = $1 ORDER BY created_at DESC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
