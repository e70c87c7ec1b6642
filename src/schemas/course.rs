use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::types::CourseStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[validate(length(min = 1, max = 50, message = "term must not be empty"))]
    pub(crate) term: String,
    #[serde(default)]
    pub(crate) syllabus: String,
    #[serde(default)]
    pub(crate) status: CourseStatus,
    #[serde(default)]
    pub(crate) is_public: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "term must not be empty"))]
    pub(crate) term: Option<String>,
    #[serde(default)]
    pub(crate) syllabus: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<CourseStatus>,
    #[serde(default)]
    pub(crate) is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) term: String,
    pub(crate) syllabus: String,
    pub(crate) status: CourseStatus,
    pub(crate) is_public: bool,
    pub(crate) professor_id: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: crate::db::models::Course) -> Self {
        Self {
            id: course.id.to_string(),
            title: course.title,
            description: course.description,
            term: course.term,
            syllabus: course.syllabus,
            status: course.status,
            is_public: course.is_public,
            professor_id: course.professor_id.to_string(),
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

/// A course as seen by one caller, with that caller's relationship to it.
#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailResponse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) is_professor: bool,
    pub(crate) is_ta: bool,
    pub(crate) is_student: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignTaRequest {
    pub(crate) ta_id: uuid::Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoveTaQuery {
    pub(crate) ta_id: uuid::Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollStudentRequest {
    pub(crate) student_id: uuid::Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnenrollStudentQuery {
    pub(crate) student_id: uuid::Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BulkEnrollRequest {
    #[validate(length(min = 1, max = 500, message = "emails must contain 1 to 500 entries"))]
    pub(crate) emails: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BulkEnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
    NotFound,
    NotAStudent,
    /// Storage error for this entry; the rest of the batch still runs.
    Failed,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkEnrollEntry {
    pub(crate) email: String,
    pub(crate) outcome: BulkEnrollOutcome,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkEnrollResponse {
    pub(crate) enrolled: usize,
    pub(crate) failed: usize,
    pub(crate) results: Vec<BulkEnrollEntry>,
}
