use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CourseMember, CourseStaff};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::announcement::{AnnouncementCreate, AnnouncementResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_announcements).post(publish_announcement))
}

async fn list_announcements(
    State(state): State<AppState>,
    member: CourseMember,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let announcements = repositories::announcements::list_for_course(state.db(), member.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list announcements"))?;

    Ok(Json(announcements.into_iter().map(AnnouncementResponse::from_db).collect()))
}

async fn publish_announcement(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<AnnouncementCreate>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let announcement = repositories::announcements::create(
        state.db(),
        repositories::announcements::CreateAnnouncement {
            id: Uuid::new_v4(),
            course_id: staff.course_id,
            publisher_id: staff.auth.user_id,
            title: payload.title.trim(),
            content: &payload.content,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to publish announcement"))?;

    tracing::info!(
        course_id = %staff.course_id,
        announcement_id = %announcement.id,
        "Announcement published"
    );

    Ok((StatusCode::CREATED, Json(AnnouncementResponse::from_db(announcement))))
}
