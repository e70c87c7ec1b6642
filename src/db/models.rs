use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::types::{CourseStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) verification_code: Option<String>,
    pub(crate) verification_code_created_at: Option<PrimitiveDateTime>,
    pub(crate) is_verified: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) term: String,
    pub(crate) syllabus: String,
    pub(crate) status: CourseStatus,
    pub(crate) is_public: bool,
    pub(crate) professor_id: Uuid,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Material {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) file_type: String,
    pub(crate) file_path: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: PrimitiveDateTime,
    pub(crate) points_value: f64,
    pub(crate) submission_type: String,
    pub(crate) allow_late: bool,
    pub(crate) late_penalty: f64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: PrimitiveDateTime,
    /// Minutes.
    pub(crate) time_limit: i32,
    pub(crate) attempts: i32,
    pub(crate) points_value: f64,
    pub(crate) visible_from: Option<PrimitiveDateTime>,
    pub(crate) visible_to: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: Uuid,
    pub(crate) assignment_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) content: String,
    pub(crate) file_path: Option<String>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) is_late: bool,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_by: Option<Uuid>,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Announcement {
    pub(crate) id: Uuid,
    pub(crate) course_id: Uuid,
    pub(crate) publisher_id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: PrimitiveDateTime,
}
