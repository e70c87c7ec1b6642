use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Account role, fixed at sign-up. It decides which course relationship a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Professor,
    Ta,
}

impl UserRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professor => "professor",
            Self::Ta => "ta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
pub(crate) enum CourseStatus {
    #[default]
    Draft,
    Published,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Ta).unwrap(), "\"ta\"");
        assert_eq!(
            serde_json::from_str::<UserRole>("\"professor\"").unwrap(),
            UserRole::Professor
        );
        assert!(serde_json::from_str::<UserRole>("\"admin\"").is_err());
    }

    #[test]
    fn course_status_defaults_to_draft() {
        assert_eq!(CourseStatus::default(), CourseStatus::Draft);
        assert_eq!(serde_json::to_string(&CourseStatus::Published).unwrap(), "\"published\"");
    }
}
