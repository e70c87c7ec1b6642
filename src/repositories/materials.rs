use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Material;

const COLUMNS: &str =
    "id, course_id, title, description, file_type, file_path, created_at, updated_at";

pub(crate) struct CreateMaterial<'a> {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) file_type: &'a str,
    pub(crate) file_path: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateMaterial {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) file_type: Option<String>,
    pub(crate) file_path: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMaterial<'_>,
) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "INSERT INTO materials (
            id, course_id, title, description, file_type, file_path, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.file_type)
    .bind(params.file_path)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    material_id: Uuid,
) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {COLUMNS} FROM materials WHERE id = $1"))
        .bind(material_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {COLUMNS} FROM materials WHERE course_id = $1 ORDER BY created_at DESC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    material_id: Uuid,
    params: UpdateMaterial,
) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "UPDATE materials SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            file_type = COALESCE($3, file_type),
            file_path = COALESCE($4, file_path),
            updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.file_type)
    .bind(params.file_path)
    .bind(params.updated_at)
    .bind(material_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, material_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1")
        .bind(material_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
