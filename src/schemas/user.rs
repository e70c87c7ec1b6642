use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::security;
use crate::core::time::format_primitive;
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignUpRequest {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub(crate) username: String,
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
    #[validate(must_match(other = "email", message = "Emails do not match"))]
    pub(crate) confirm_email: String,
    #[validate(custom(function = "validate_strong_password"))]
    pub(crate) password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub(crate) confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignInRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct VerifyRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
    #[validate(length(equal = 6, message = "Verification code must be 6 characters"))]
    pub(crate) code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ResendCodeRequest {
    #[validate(email(message = "Invalid email address"))]
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) is_verified: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: crate::db::models::User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            created_at: format_primitive(user.created_at),
        }
    }
}

fn validate_strong_password(password: &str) -> Result<(), ValidationError> {
    if security::is_strong_password(password) {
        return Ok(());
    }

    let mut error = ValidationError::new("weak_password");
    error.message = Some(
        format!(
            "Password must be at least {} characters and contain an uppercase letter, \
             a number and a special character",
            security::MIN_PASSWORD_LENGTH
        )
        .into(),
    );
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm_password: &str, confirm_email: &str) -> SignUpRequest {
        SignUpRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            confirm_email: confirm_email.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        }
    }

    #[test]
    fn signup_accepts_strong_matching_input() {
        assert!(signup("Abc123!@", "Abc123!@", "ada@example.com").validate().is_ok());
    }

    #[test]
    fn signup_rejects_weak_password() {
        let errors = signup("abc12345", "abc12345", "ada@example.com")
            .validate()
            .expect_err("weak password");
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn signup_rejects_mismatched_confirmations() {
        let errors = signup("Abc123!@", "Abc123!#", "ada@example.org")
            .validate()
            .expect_err("mismatch");
        let fields = errors.field_errors();
        assert!(fields.contains_key("confirm_password"));
        assert!(fields.contains_key("confirm_email"));
    }

    #[test]
    fn signup_ignores_a_requested_role() {
        let payload: SignUpRequest = serde_json::from_value(serde_json::json!({
            "username": "ada",
            "email": "ada@example.com",
            "confirm_email": "ada@example.com",
            "password": "Abc123!@",
            "confirm_password": "Abc123!@",
            "role": "professor"
        }))
        .expect("payload");
        assert!(payload.validate().is_ok());
        assert_eq!(payload.username, "ada");
    }
}
