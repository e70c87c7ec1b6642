use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_staff, Authenticated};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::assignment::{GradeRequest, SubmissionResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:submission_id/grade", post(grade_submission))
}

async fn grade_submission(
    Path(submission_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let course_id = repositories::submissions::find_course_id(state.db(), submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    let grader = require_course_staff(&state, &auth, course_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !payload.grade.is_finite() {
        return Err(ApiError::BadRequest("grade must be a finite number".to_string()));
    }

    let submission = repositories::submissions::grade(
        state.db(),
        submission_id,
        repositories::submissions::GradeSubmission {
            grade: payload.grade,
            feedback: payload.feedback.as_deref(),
            graded_by: grader.id,
            graded_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to grade submission"))?
    .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    tracing::info!(
        submission_id = %submission_id,
        course_id = %course_id,
        graded_by = %grader.id,
        "Submission graded"
    );

    Ok(Json(SubmissionResponse::from_db(submission)))
}
