use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use time::{Duration, PrimitiveDateTime};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_staff, AuthContext, Authenticated, CourseMember, CourseStaff,
};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Quiz;
use crate::repositories;
use crate::schemas::quiz::{QuizCreate, QuizResponse, QuizUpdate, DEFAULT_DUE_IN_DAYS};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/:quiz_id", patch(update_quiz).delete(delete_quiz))
}

/// Students only see a quiz inside its visibility window; an open bound is unbounded.
fn is_visible(quiz: &Quiz, now: PrimitiveDateTime) -> bool {
    quiz.visible_from.map_or(true, |from| from <= now)
        && quiz.visible_to.map_or(true, |to| now <= to)
}

fn check_window(
    visible_from: Option<PrimitiveDateTime>,
    visible_to: Option<PrimitiveDateTime>,
) -> Result<(), ApiError> {
    match (visible_from, visible_to) {
        (Some(from), Some(to)) if from > to => {
            Err(ApiError::BadRequest("visible_from must not be after visible_to".to_string()))
        }
        _ => Ok(()),
    }
}

async fn list_quizzes(
    State(state): State<AppState>,
    member: CourseMember,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    let quizzes = repositories::quizzes::list_for_course(state.db(), member.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let now = primitive_now_utc();
    Ok(Json(
        quizzes
            .into_iter()
            .filter(|quiz| member.is_staff || is_visible(quiz, now))
            .map(QuizResponse::from_db)
            .collect(),
    ))
}

async fn create_quiz(
    State(state): State<AppState>,
    staff: CourseStaff,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let visible_from = payload.visible_from.map(to_primitive_utc);
    let visible_to = payload.visible_to.map(to_primitive_utc);
    check_window(visible_from, visible_to)?;

    let now = primitive_now_utc();
    let due_date = payload
        .due_date
        .map(to_primitive_utc)
        .unwrap_or_else(|| now + Duration::days(DEFAULT_DUE_IN_DAYS));

    let quiz = repositories::quizzes::create(
        state.db(),
        repositories::quizzes::CreateQuiz {
            id: Uuid::new_v4(),
            course_id: staff.course_id,
            title: payload.title.trim(),
            description: &payload.description,
            due_date,
            time_limit: payload.time_limit,
            attempts: payload.attempts,
            points_value: payload.points_value,
            visible_from,
            visible_to,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    tracing::info!(course_id = %staff.course_id, quiz_id = %quiz.id, "Quiz created");

    Ok((StatusCode::CREATED, Json(QuizResponse::from_db(quiz))))
}

async fn quiz_for_staff(
    state: &AppState,
    auth: &AuthContext,
    quiz_id: Uuid,
) -> Result<Quiz, ApiError> {
    let quiz = repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    require_course_staff(state, auth, quiz.course_id).await?;
    Ok(quiz)
}

async fn update_quiz(
    Path(quiz_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
    Json(payload): Json<QuizUpdate>,
) -> Result<Json<QuizResponse>, ApiError> {
    let current = quiz_for_staff(&state, &auth, quiz_id).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let visible_from = payload.visible_from.map(to_primitive_utc);
    let visible_to = payload.visible_to.map(to_primitive_utc);
    check_window(visible_from.or(current.visible_from), visible_to.or(current.visible_to))?;

    let quiz = repositories::quizzes::update(
        state.db(),
        quiz_id,
        repositories::quizzes::UpdateQuiz {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            due_date: payload.due_date.map(to_primitive_utc),
            time_limit: payload.time_limit,
            attempts: payload.attempts,
            points_value: payload.points_value,
            visible_from,
            visible_to,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update quiz"))?
    .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(QuizResponse::from_db(quiz)))
}

async fn delete_quiz(
    Path(quiz_id): Path<Uuid>,
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<StatusCode, ApiError> {
    quiz_for_staff(&state, &auth, quiz_id).await?;

    let deleted = repositories::quizzes::delete(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete quiz"))?;
    if !deleted {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(quiz_id = %quiz_id, deleted_by = %auth.user_id, "Quiz deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn quiz(
        visible_from: Option<PrimitiveDateTime>,
        visible_to: Option<PrimitiveDateTime>,
    ) -> Quiz {
        let created = datetime!(2025-04-01 08:00);
        Quiz {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "Week 1".to_string(),
            description: String::new(),
            due_date: datetime!(2025-05-10 23:59),
            time_limit: 60,
            attempts: 1,
            points_value: 10.0,
            visible_from,
            visible_to,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn unbounded_quiz_is_always_visible() {
        assert!(is_visible(&quiz(None, None), datetime!(2030-01-01 00:00)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let from = datetime!(2025-05-01 09:00);
        let to = datetime!(2025-05-08 09:00);
        let windowed = quiz(Some(from), Some(to));

        assert!(!is_visible(&windowed, datetime!(2025-05-01 08:59)));
        assert!(is_visible(&windowed, from));
        assert!(is_visible(&windowed, to));
        assert!(!is_visible(&windowed, datetime!(2025-05-08 09:01)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let early = datetime!(2025-05-01 09:00);
        let late = datetime!(2025-05-08 09:00);

        assert!(check_window(Some(early), Some(late)).is_ok());
        assert!(check_window(Some(late), None).is_ok());
        let err = check_window(Some(late), Some(early)).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
