use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_staff, AuthContext, Authenticated, CourseMember, CourseStaff,
};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Material;
use crate::repositories;
use crate::schemas::material::{MaterialCreate, MaterialResponse, MaterialUpdate};

pub(super) async fn list_materials(
    State(state): State<AppState>,
    member: CourseMember,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    let materials = repositories::materials::list_for_course(state.db(), member.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list materials"))?;

    Ok(Json(materials.into_iter().map(MaterialResponse::from_db).collect()))
}

pub(super) async fn create_material(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<MaterialCreate>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let material = repositories::materials::create(
        state.db(),
        repositories::materials::CreateMaterial {
            id: Uuid::new_v4(),
            course_id: staff.course_id,
            title: payload.title.trim(),
            description: &payload.description,
            file_type: payload.file_type.trim(),
            file_path: payload.file_path.trim(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create material"))?;

    tracing::info!(
        course_id = %staff.course_id,
        material_id = %material.id,
        author_id = %staff.auth.user_id,
        "Material created"
    );

    Ok((StatusCode::CREATED, Json(MaterialResponse::from_db(material))))
}

/// Loads the material and checks the caller is staff of its course.
async fn material_for_staff(
    state: &AppState,
    auth: &AuthContext,
    material_id: Uuid,
) -> Result<Material, ApiError> {
    let material = repositories::materials::find_by_id(state.db(), material_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    require_course_staff(state, auth, material.course_id).await?;
    Ok(material)
}

pub(super) async fn update_material(
    Path(material_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    Json(payload): Json<MaterialUpdate>,
) -> Result<Json<MaterialResponse>, ApiError> {
    material_for_staff(&state, &auth, material_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let material = repositories::materials::update(
        state.db(),
        material_id,
        repositories::materials::UpdateMaterial {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            file_type: payload.file_type.map(|file_type| file_type.trim().to_string()),
            file_path: payload.file_path,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update material"))?
    .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    Ok(Json(MaterialResponse::from_db(material)))
}

pub(super) async fn delete_material(
    Path(material_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<StatusCode, ApiError> {
    material_for_staff(&state, &auth, material_id).await?;

    let deleted = repositories::materials::delete(state.db(), material_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete material"))?;
    if !deleted {
        return Err(ApiError::NotFound("Material not found".to_string()));
    }

    tracing::info!(material_id = %material_id, deleted_by = %auth.user_id, "Material deleted");
    Ok(StatusCode::NO_CONTENT)
}
