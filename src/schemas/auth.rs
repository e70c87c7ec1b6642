use serde::Serialize;

use crate::core::time::{format_primitive, to_primitive_utc};
use crate::core::tokens::TokenPair;
use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: String,
    pub(crate) access_expires_at: String,
    pub(crate) refresh_expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<UserResponse>,
}

impl TokenResponse {
    pub(crate) fn new(pair: &TokenPair, user: Option<UserResponse>) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            token_type: "bearer".to_string(),
            access_expires_at: format_primitive(to_primitive_utc(pair.access_expires_at)),
            refresh_expires_at: format_primitive(to_primitive_utc(pair.refresh_expires_at)),
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpResponse {
    pub(crate) user: UserResponse,
    pub(crate) detail: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) detail: String,
}
