use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use super::assignment::deserialize_option_offset_datetime_flexible;
use crate::core::time::format_primitive;

pub(crate) const DEFAULT_TIME_LIMIT_MINUTES: i32 = 60;
pub(crate) const DEFAULT_ATTEMPTS: i32 = 1;
pub(crate) const DEFAULT_DUE_IN_DAYS: i64 = 7;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    /// Defaults to a week after creation.
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) due_date: Option<OffsetDateTime>,
    #[serde(default = "default_time_limit")]
    #[validate(range(min = 1, message = "time_limit must be at least one minute"))]
    pub(crate) time_limit: i32,
    #[serde(default = "default_attempts")]
    #[validate(range(min = 1, message = "attempts must be at least 1"))]
    pub(crate) attempts: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "points_value must be non-negative"))]
    pub(crate) points_value: f64,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) visible_from: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) visible_to: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) due_date: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(range(min = 1, message = "time_limit must be at least one minute"))]
    pub(crate) time_limit: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1, message = "attempts must be at least 1"))]
    pub(crate) attempts: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "points_value must be non-negative"))]
    pub(crate) points_value: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) visible_from: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) visible_to: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: String,
    pub(crate) time_limit: i32,
    pub(crate) attempts: i32,
    pub(crate) points_value: f64,
    pub(crate) visible_from: Option<String>,
    pub(crate) visible_to: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: crate::db::models::Quiz) -> Self {
        Self {
            id: quiz.id.to_string(),
            course_id: quiz.course_id.to_string(),
            title: quiz.title,
            description: quiz.description,
            due_date: format_primitive(quiz.due_date),
            time_limit: quiz.time_limit,
            attempts: quiz.attempts,
            points_value: quiz.points_value,
            visible_from: quiz.visible_from.map(format_primitive),
            visible_to: quiz.visible_to.map(format_primitive),
            created_at: format_primitive(quiz.created_at),
            updated_at: format_primitive(quiz.updated_at),
        }
    }
}

fn default_time_limit() -> i32 {
    DEFAULT_TIME_LIMIT_MINUTES
}

fn default_attempts() -> i32 {
    DEFAULT_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_create_defaults() {
        let payload: QuizCreate =
            serde_json::from_value(serde_json::json!({"title": "Week 1"})).expect("payload");

        assert_eq!(payload.time_limit, 60);
        assert_eq!(payload.attempts, 1);
        assert_eq!(payload.points_value, 0.0);
        assert!(payload.due_date.is_none());
        assert!(payload.visible_from.is_none() && payload.visible_to.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn quiz_create_rejects_zero_attempts_and_time_limit() {
        let payload: QuizCreate = serde_json::from_value(serde_json::json!({
            "title": "Week 1",
            "time_limit": 0,
            "attempts": 0
        }))
        .expect("payload");

        let errors = payload.validate().expect_err("invalid limits");
        let fields = errors.field_errors();
        assert!(fields.contains_key("time_limit"));
        assert!(fields.contains_key("attempts"));
    }

    #[test]
    fn visibility_window_accepts_datetime_local() {
        let payload: QuizCreate = serde_json::from_value(serde_json::json!({
            "title": "Week 1",
            "visible_from": "2025-05-01T09:00",
            "visible_to": "2025-05-08T09:00:00Z"
        }))
        .expect("payload");

        let from = payload.visible_from.expect("from");
        let to = payload.visible_to.expect("to");
        assert_eq!((to - from).whole_days(), 7);
    }
}
