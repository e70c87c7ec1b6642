use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_principal, require_course_staff, AuthContext, Authenticated, CourseMember, CourseStaff,
};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Assignment;
use crate::repositories;
use crate::schemas::assignment::{
    AssignmentCreate, AssignmentResponse, AssignmentUpdate, SubmissionCreate, SubmissionResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route("/:assignment_id", patch(update_assignment).delete(delete_assignment))
        .route("/:assignment_id/submissions", get(list_submissions).post(submit))
}

async fn list_assignments(
    State(state): State<AppState>,
    member: CourseMember,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = repositories::assignments::list_for_course(state.db(), member.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

async fn create_assignment(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assignment = repositories::assignments::create(
        state.db(),
        repositories::assignments::CreateAssignment {
            id: Uuid::new_v4(),
            course_id: staff.course_id,
            title: payload.title.trim(),
            description: &payload.description,
            due_date: to_primitive_utc(payload.due_date),
            points_value: payload.points_value,
            submission_type: payload.submission_type.trim(),
            allow_late: payload.allow_late,
            late_penalty: payload.late_penalty,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

    tracing::info!(
        course_id = %staff.course_id,
        assignment_id = %assignment.id,
        "Assignment created"
    );

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

async fn load_assignment(state: &AppState, assignment_id: Uuid) -> Result<Assignment, ApiError> {
    repositories::assignments::find_by_id(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))
}

async fn assignment_for_staff(
    state: &AppState,
    auth: &AuthContext,
    assignment_id: Uuid,
) -> Result<Assignment, ApiError> {
    let assignment = load_assignment(state, assignment_id).await?;
    require_course_staff(state, auth, assignment.course_id).await?;
    Ok(assignment)
}

async fn update_assignment(
    Path(assignment_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    Json(payload): Json<AssignmentUpdate>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    assignment_for_staff(&state, &auth, assignment_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assignment = repositories::assignments::update(
        state.db(),
        assignment_id,
        repositories::assignments::UpdateAssignment {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            due_date: payload.due_date.map(to_primitive_utc),
            points_value: payload.points_value,
            submission_type: payload.submission_type,
            allow_late: payload.allow_late,
            late_penalty: payload.late_penalty,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update assignment"))?
    .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(AssignmentResponse::from_db(assignment)))
}

async fn delete_assignment(
    Path(assignment_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<StatusCode, ApiError> {
    assignment_for_staff(&state, &auth, assignment_id).await?;

    let deleted = repositories::assignments::delete(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;
    if !deleted {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    tracing::info!(assignment_id = %assignment_id, deleted_by = %auth.user_id, "Assignment deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_submissions(
    Path(assignment_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    assignment_for_staff(&state, &auth, assignment_id).await?;

    let submissions = repositories::submissions::list_for_assignment(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from_db).collect()))
}

/// Whether a submission at `now` counts as late. Past the due date it is
/// refused outright unless the assignment allows late work.
fn lateness(
    due_date: PrimitiveDateTime,
    allow_late: bool,
    now: PrimitiveDateTime,
) -> Result<bool, ApiError> {
    if now <= due_date {
        return Ok(false);
    }
    if allow_late {
        Ok(true)
    } else {
        Err(ApiError::BadRequest("Assignment is past due".to_string()))
    }
}

async fn submit(
    Path(assignment_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    Json(payload): Json<SubmissionCreate>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assignment = load_assignment(&state, assignment_id).await?;
    let principal = load_principal(&state, &auth).await?;
    if !state.relationships().is_enrolled_in(&principal, assignment.course_id).await {
        return Err(ApiError::Forbidden("Unauthorized: You are not enrolled in this course"));
    }

    let now = primitive_now_utc();
    let is_late = lateness(assignment.due_date, assignment.allow_late, now)?;

    let submission = repositories::submissions::create(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: Uuid::new_v4(),
            assignment_id,
            user_id: auth.user_id,
            content: &payload.content,
            file_path: payload.file_path.as_deref(),
            submitted_at: now,
            is_late,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create submission"))?;

    tracing::info!(
        assignment_id = %assignment_id,
        submission_id = %submission.id,
        user_id = %auth.user_id,
        is_late,
        "Submission received"
    );

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from_db(submission))))
}
