use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) due_date: OffsetDateTime,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "points_value must be non-negative"))]
    pub(crate) points_value: f64,
    #[serde(default = "default_submission_type")]
    pub(crate) submission_type: String,
    #[serde(default)]
    pub(crate) allow_late: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "late_penalty must be between 0 and 100"))]
    pub(crate) late_penalty: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) due_date: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "points_value must be non-negative"))]
    pub(crate) points_value: Option<f64>,
    #[serde(default)]
    pub(crate) submission_type: Option<String>,
    #[serde(default)]
    pub(crate) allow_late: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "late_penalty must be between 0 and 100"))]
    pub(crate) late_penalty: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: String,
    pub(crate) points_value: f64,
    pub(crate) submission_type: String,
    pub(crate) allow_late: bool,
    pub(crate) late_penalty: f64,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: crate::db::models::Assignment) -> Self {
        Self {
            id: assignment.id.to_string(),
            course_id: assignment.course_id.to_string(),
            title: assignment.title,
            description: assignment.description,
            due_date: format_primitive(assignment.due_date),
            points_value: assignment.points_value,
            submission_type: assignment.submission_type,
            allow_late: assignment.allow_late,
            late_penalty: assignment.late_penalty,
            created_at: format_primitive(assignment.created_at),
            updated_at: format_primitive(assignment.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmissionCreate {
    #[serde(default)]
    #[validate(length(max = 100_000, message = "content is too long"))]
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) file_path: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeRequest {
    #[validate(range(min = 0.0, message = "grade must be non-negative"))]
    pub(crate) grade: f64,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) user_id: String,
    pub(crate) content: String,
    pub(crate) file_path: Option<String>,
    pub(crate) submitted_at: String,
    pub(crate) is_late: bool,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_by: Option<String>,
    pub(crate) graded_at: Option<String>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: crate::db::models::Submission) -> Self {
        Self {
            id: submission.id.to_string(),
            assignment_id: submission.assignment_id.to_string(),
            user_id: submission.user_id.to_string(),
            content: submission.content,
            file_path: submission.file_path,
            submitted_at: format_primitive(submission.submitted_at),
            is_late: submission.is_late,
            grade: submission.grade,
            feedback: submission.feedback,
            graded_by: submission.graded_by.map(|id| id.to_string()),
            graded_at: submission.graded_at.map(format_primitive),
        }
    }
}

fn default_submission_type() -> String {
    "text".to_string()
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // Browser datetime-local inputs omit seconds and the offset.
    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

fn deserialize_offset_datetime_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_offset_datetime_flexible(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

pub(super) fn deserialize_option_offset_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_offset_datetime_flexible(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_accepts_rfc3339_and_datetime_local() {
        let with_offset = parse_offset_datetime_flexible("2025-05-01T12:00:00+02:00").unwrap();
        assert_eq!(with_offset.unix_timestamp(), 1_746_093_600);

        let local = parse_offset_datetime_flexible("2025-05-01T10:00").unwrap();
        assert_eq!(local, with_offset);

        assert!(parse_offset_datetime_flexible("next tuesday").is_none());
    }

    #[test]
    fn assignment_create_defaults() {
        let payload: AssignmentCreate = serde_json::from_value(serde_json::json!({
            "title": "Lab 1",
            "due_date": "2025-05-01T10:00"
        }))
        .expect("payload");

        assert_eq!(payload.submission_type, "text");
        assert!(!payload.allow_late);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_grade_is_rejected() {
        let request = GradeRequest { grade: -1.0, feedback: None };
        assert!(request.validate().is_err());
    }
}
