//! Request authorization extractors.
//!
//! Each guard runs its checks in order and rejects on the first failure, before the
//! handler body runs. Course-scoped guards read `course_id` from the query string.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::{header, request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::tokens::{self, AccessClaims, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::db::types::UserRole;
use crate::services::relationships::Principal;

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthContext {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) role: UserRole,
    pub(crate) token_id: Uuid,
}

impl From<AccessClaims> for AuthContext {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
            token_id: claims.uuid,
        }
    }
}

pub(crate) struct Authenticated(pub(crate) AuthContext);
pub(crate) struct CurrentProfessor(pub(crate) AuthContext);
pub(crate) struct CurrentTa(pub(crate) AuthContext);

/// Professor or teaching assistant of the `course_id` in the query.
pub(crate) struct CourseStaff {
    pub(crate) auth: AuthContext,
    pub(crate) principal: Principal,
    pub(crate) course_id: Uuid,
}

/// Staff of, or a student enrolled in, the `course_id` in the query.
pub(crate) struct CourseMember {
    pub(crate) course_id: Uuid,
    pub(crate) is_staff: bool,
}

/// Bearer header first, then the named cookie.
pub(crate) fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

fn auth_path(state: &AppState, endpoint: &str) -> String {
    format!("{}/auth/{endpoint}", state.settings().api().api_v1_str)
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers, ACCESS_TOKEN_COOKIE) else {
            return Err(ApiError::Redirect(auth_path(state, "signin")));
        };

        match tokens::verify_access_token(&token, state.settings().security()) {
            Ok(claims) => {
                let auth = AuthContext::from(claims);
                tracing::debug!(
                    user_id = %auth.user_id,
                    username = %auth.username,
                    token_id = %auth.token_id,
                    "Access token accepted"
                );
                Ok(Authenticated(auth))
            }
            Err(_) => {
                let can_refresh =
                    CookieJar::from_headers(&parts.headers).get(REFRESH_TOKEN_COOKIE).is_some();
                let target = if can_refresh { "refresh" } else { "signin" };
                Err(ApiError::Redirect(auth_path(state, target)))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentProfessor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(auth) = Authenticated::from_request_parts(parts, state).await?;

        match auth.role {
            UserRole::Professor => Ok(CurrentProfessor(auth)),
            UserRole::Ta | UserRole::Student => {
                Err(ApiError::Forbidden("Unauthorized: Professors only"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTa {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(auth) = Authenticated::from_request_parts(parts, state).await?;

        match auth.role {
            UserRole::Ta => Ok(CurrentTa(auth)),
            UserRole::Professor | UserRole::Student => {
                Err(ApiError::Forbidden("Unauthorized: Teaching assistants only"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CourseIdQuery {
    course_id: Option<String>,
}

pub(crate) fn course_id_from_parts(parts: &Parts) -> Result<Uuid, ApiError> {
    let raw = Query::<CourseIdQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.course_id)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Course ID is required".to_string()))?;

    Uuid::parse_str(&raw).map_err(|_| ApiError::BadRequest("Invalid Course ID".to_string()))
}

/// The `course_id` query parameter, for handlers that apply their own access rule.
pub(crate) struct RequestedCourse(pub(crate) Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestedCourse {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        course_id_from_parts(parts).map(RequestedCourse)
    }
}

pub(crate) async fn load_principal(
    state: &AppState,
    auth: &AuthContext,
) -> Result<Principal, ApiError> {
    state
        .directory()
        .find_principal(auth.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("User not found"))
}

#[async_trait]
impl FromRequestParts<AppState> for CourseStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(auth) = Authenticated::from_request_parts(parts, state).await?;
        let course_id = course_id_from_parts(parts)?;
        let principal = load_principal(state, &auth).await?;

        if !state.relationships().is_course_staff(&principal, course_id).await {
            return Err(ApiError::Forbidden("Unauthorized: You are not staff for this course"));
        }

        Ok(CourseStaff { auth, principal, course_id })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CourseMember {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(auth) = Authenticated::from_request_parts(parts, state).await?;
        let course_id = course_id_from_parts(parts)?;
        let principal = load_principal(state, &auth).await?;

        let relationships = state.relationships();
        let is_staff = relationships.is_course_staff(&principal, course_id).await;
        if !is_staff && !relationships.is_enrolled_in(&principal, course_id).await {
            return Err(ApiError::Forbidden("Unauthorized: You are not enrolled in this course"));
        }

        Ok(CourseMember { course_id, is_staff })
    }
}

/// Staff check for routes that locate the course through another resource.
pub(crate) async fn require_course_staff(
    state: &AppState,
    auth: &AuthContext,
    course_id: Uuid,
) -> Result<Principal, ApiError> {
    let principal = load_principal(state, auth).await?;

    if state.relationships().is_course_staff(&principal, course_id).await {
        Ok(principal)
    } else {
        Err(ApiError::Forbidden("Unauthorized: You are not staff for this course"))
    }
}

pub(crate) async fn require_course_professor(
    state: &AppState,
    principal: &Principal,
    course_id: Uuid,
) -> Result<(), ApiError> {
    if state.relationships().is_professor_of(principal, course_id).await {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only the course professor can perform this action"))
    }
}
