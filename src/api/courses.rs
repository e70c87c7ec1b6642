use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_principal, require_course_professor, Authenticated, CourseStaff, CurrentProfessor,
    CurrentTa, RequestedCourse,
};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::MessageResponse;
use crate::schemas::course::{
    AssignTaRequest, BulkEnrollEntry, BulkEnrollOutcome, BulkEnrollRequest, BulkEnrollResponse,
    CourseCreate, CourseDetailResponse, CourseResponse, CourseUpdate, EnrollStudentRequest,
    RemoveTaQuery, UnenrollStudentQuery,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/assisting", get(list_assisting))
        .route("/detail", get(course_detail).patch(update_course))
        .route("/tas", post(assign_ta).delete(remove_ta))
        .route("/enrollments", post(enroll_student).delete(unenroll_student))
        .route("/enrollments/bulk", post(bulk_enroll))
}

async fn list_courses(
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = match auth.role {
        UserRole::Professor => {
            repositories::courses::list_taught_by(state.db(), auth.user_id).await
        }
        UserRole::Ta => repositories::courses::list_assisted_by(state.db(), auth.user_id).await,
        UserRole::Student => {
            repositories::courses::list_visible_to_student(state.db(), auth.user_id).await
        }
    }
    .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentProfessor(professor): CurrentProfessor,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Course title must not be empty".to_string()));
    }

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: Uuid::new_v4(),
            title: payload.title.trim(),
            description: &payload.description,
            term: payload.term.trim(),
            syllabus: &payload.syllabus,
            status: payload.status,
            is_public: payload.is_public,
            professor_id: professor.user_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    tracing::info!(course_id = %course.id, professor_id = %professor.user_id, "Course created");

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn list_assisting(
    State(state): State<AppState>,
    CurrentTa(ta): CurrentTa,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list_assisted_by(state.db(), ta.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assisted courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn course_detail(
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    RequestedCourse(course_id): RequestedCourse,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let principal = load_principal(&state, &auth).await?;
    let relationships = state.relationships();
    if !relationships.has_course_access(&principal, course_id).await {
        return Err(ApiError::Forbidden("Unauthorized: You do not have access to this course"));
    }

    let is_professor = relationships.is_professor_of(&principal, course_id).await;
    let is_ta = relationships.is_ta_of(&principal, course_id).await;
    let is_student = relationships.is_enrolled_in(&principal, course_id).await;

    Ok(Json(CourseDetailResponse {
        course: CourseResponse::from_db(course),
        is_professor,
        is_ta,
        is_student,
    }))
}

async fn update_course(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::update(
        state.db(),
        staff.course_id,
        repositories::courses::UpdateCourse {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            term: payload.term.map(|term| term.trim().to_string()),
            syllabus: payload.syllabus,
            status: payload.status,
            is_public: payload.is_public,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(CourseResponse::from_db(course)))
}

/// Role of the user a professor is about to attach to a course.
async fn target_role(state: &AppState, user_id: Uuid) -> Result<UserRole, ApiError> {
    repositories::users::find_role_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

async fn assign_ta(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<AssignTaRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;

    match target_role(&state, payload.ta_id).await? {
        UserRole::Ta => {}
        UserRole::Student | UserRole::Professor => {
            return Err(ApiError::BadRequest("Selected user is not a TA".to_string()))
        }
    }

    let assigned = repositories::course_assistants::assign(
        state.db(),
        staff.course_id,
        payload.ta_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to assign TA"))?;
    if !assigned {
        return Err(ApiError::Conflict("TA is already assigned to this course".to_string()));
    }

    tracing::info!(course_id = %staff.course_id, ta_id = %payload.ta_id, "TA assigned");

    Ok((StatusCode::CREATED, Json(MessageResponse { detail: "TA assigned".to_string() })))
}

async fn remove_ta(
    State(state): State<AppState>,
    staff: CourseStaff,
    Query(query): Query<RemoveTaQuery>,
) -> Result<StatusCode, ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;

    let removed =
        repositories::course_assistants::remove(state.db(), staff.course_id, query.ta_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to remove TA"))?;
    if !removed {
        return Err(ApiError::NotFound("TA is not assigned to this course".to_string()));
    }

    tracing::info!(course_id = %staff.course_id, ta_id = %query.ta_id, "TA removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn enroll_student(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<EnrollStudentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;

    match target_role(&state, payload.student_id).await? {
        UserRole::Student => {}
        UserRole::Ta | UserRole::Professor => {
            return Err(ApiError::BadRequest("Selected user is not a student".to_string()))
        }
    }

    let enrolled = repositories::enrollments::enroll(
        state.db(),
        staff.course_id,
        payload.student_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to enroll student"))?;
    if !enrolled {
        return Err(ApiError::Conflict("Student is already enrolled in this course".to_string()));
    }

    Ok((StatusCode::CREATED, Json(MessageResponse { detail: "Student enrolled".to_string() })))
}

async fn unenroll_student(
    State(state): State<AppState>,
    staff: CourseStaff,
    Query(query): Query<UnenrollStudentQuery>,
) -> Result<StatusCode, ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;

    let removed =
        repositories::enrollments::unenroll(state.db(), staff.course_id, query.student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to unenroll student"))?;
    if !removed {
        return Err(ApiError::NotFound("Student is not enrolled in this course".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_enroll(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<BulkEnrollRequest>,
) -> Result<Json<BulkEnrollResponse>, ApiError> {
    require_course_professor(&state, &staff.principal, staff.course_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let mut results = Vec::with_capacity(payload.emails.len());
    for raw in payload.emails {
        let email = raw.trim().to_string();
        let attempt = enroll_by_email(&state, staff.course_id, &email, now).await;
        let outcome = settle_bulk_entry(&email, attempt);
        results.push(BulkEnrollEntry { email, outcome });
    }

    let count = |outcome: BulkEnrollOutcome| results.iter().filter(|entry| entry.outcome == outcome).count();
    let enrolled = count(BulkEnrollOutcome::Enrolled);
    let failed = count(BulkEnrollOutcome::Failed);
    tracing::info!(
        course_id = %staff.course_id,
        requested = results.len(),
        enrolled,
        failed,
        "Bulk enrollment processed"
    );

    Ok(Json(BulkEnrollResponse { enrolled, failed, results }))
}

async fn enroll_by_email(
    state: &AppState,
    course_id: Uuid,
    email: &str,
    now: time::PrimitiveDateTime,
) -> Result<BulkEnrollOutcome, sqlx::Error> {
    let Some(user) = repositories::users::find_by_email(state.db(), email).await? else {
        return Ok(BulkEnrollOutcome::NotFound);
    };
    if user.role != UserRole::Student {
        return Ok(BulkEnrollOutcome::NotAStudent);
    }

    let enrolled = repositories::enrollments::enroll(state.db(), course_id, user.id, now).await?;
    Ok(if enrolled { BulkEnrollOutcome::Enrolled } else { BulkEnrollOutcome::AlreadyEnrolled })
}

fn settle_bulk_entry(
    email: &str,
    attempt: Result<BulkEnrollOutcome, sqlx::Error>,
) -> BulkEnrollOutcome {
    attempt.unwrap_or_else(|err| {
        tracing::warn!(error = %err, email, "Bulk enrollment entry failed");
        BulkEnrollOutcome::Failed
    })
}
