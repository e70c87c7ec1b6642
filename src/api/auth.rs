use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{extract_token, Authenticated};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, remaining_seconds};
use crate::core::tokens::{self, TokenPair, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::core::{metrics, security, verification};
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::users::IdentityConflict;
use crate::schemas::auth::{MessageResponse, SignUpResponse, TokenResponse};
use crate::schemas::user::{
    ResendCodeRequest, SignInRequest, SignUpRequest, UserResponse, VerifyRequest,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify", post(verify))
        .route("/verify/resend", post(resend_code))
        .route("/signin", post(signin))
        .route("/refresh", get(refresh).post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn ensure_not_rate_limited(
    state: &AppState,
    action: &str,
    identity: &str,
    message: &'static str,
) -> Result<(), ApiError> {
    let auth = state.settings().auth();
    let allowed = state
        .redis()
        .allow_auth_attempt(action, identity, auth.rate_limit, auth.rate_window_seconds)
        .await;
    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests(message))
    }
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let username = payload.username.trim();
    let email = payload.email.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }

    ensure_not_rate_limited(&state, "signup", email, "Too many signup attempts, try again later")
        .await?;

    let conflict = repositories::users::find_identity_conflict(state.db(), username, email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    match conflict {
        Some(IdentityConflict::Email) => {
            return Err(ApiError::Conflict("Email already registered".to_string()))
        }
        Some(IdentityConflict::Username) => {
            return Err(ApiError::Conflict("Username already taken".to_string()))
        }
        None => {}
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let code = verification::generate_code();
    // Staff roles come from seeding only.
    let role = UserRole::Student;

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: Uuid::new_v4(),
            username,
            email,
            hashed_password,
            role,
            verification_code: Some(&code),
            is_verified: false,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("Email or username already registered".to_string())
        }
        _ => ApiError::internal(e, "Failed to create user"),
    })?;

    // Delivery happens out of band; the code is only logged at debug level.
    tracing::info!(user_id = %user.id, role = role.as_str(), "User signed up");
    tracing::debug!(user_id = %user.id, code = %code, "Verification code issued");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: UserResponse::from_db(user),
            detail: "Check your email for the verification code".to_string(),
        }),
    ))
}

async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ensure_not_rate_limited(
        &state,
        "verify",
        &payload.email,
        "Too many verification attempts, try again later",
    )
    .await?;

    let user = repositories::users::find_by_email(state.db(), payload.email.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let now = primitive_now_utc();
    let submitted = payload.code.trim();
    if let Err(err) = verification::check_code(
        user.verification_code.as_deref(),
        user.verification_code_created_at,
        submitted,
        now,
        state.settings().auth().verification_code_ttl_seconds,
    ) {
        metrics::record_verification(err.outcome());
        return Err(ApiError::BadRequest(err.to_string()));
    }

    let consumed = repositories::users::mark_verified(state.db(), user.id, submitted, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to mark user verified"))?;
    if !consumed {
        let err = verification::VerificationError::NoPendingCode;
        metrics::record_verification(err.outcome());
        return Err(ApiError::BadRequest(err.to_string()));
    }

    metrics::record_verification("verified");
    tracing::info!(user_id = %user.id, "Email verified");

    Ok(Json(MessageResponse { detail: "Email verified successfully".to_string() }))
}

async fn resend_code(
    State(state): State<AppState>,
    Json(payload): Json<ResendCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ensure_not_rate_limited(
        &state,
        "verify-resend",
        &payload.email,
        "Too many verification requests, try again later",
    )
    .await?;

    let user = repositories::users::find_by_email(state.db(), payload.email.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Err(ApiError::BadRequest("Email already verified".to_string()));
    }

    let code = verification::generate_code();
    let reissued =
        repositories::users::set_verification_code(state.db(), user.id, &code, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store verification code"))?;
    if !reissued {
        return Err(ApiError::BadRequest("Email already verified".to_string()));
    }

    tracing::debug!(user_id = %user.id, code = %code, "Verification code reissued");

    Ok(Json(MessageResponse { detail: "A new verification code has been sent".to_string() }))
}

async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ensure_not_rate_limited(
        &state,
        "signin",
        &payload.email,
        "Too many login attempts, try again later",
    )
    .await?;

    let user = repositories::users::find_by_email(state.db(), payload.email.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    let Some(user) = user else {
        metrics::record_signin("unknown_user");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    };

    let valid = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|e| ApiError::internal(e, "Failed to verify password"))?;
    if !valid {
        metrics::record_signin("bad_password");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    if !user.is_verified {
        metrics::record_signin("unverified");
        return Err(ApiError::Forbidden("Please verify your email before signing in"));
    }

    let pair = tokens::create_token_pair(&user, state.settings().security())
        .map_err(|e| ApiError::internal(e, "Failed to create tokens"))?;

    metrics::record_signin("success");
    tracing::info!(user_id = %user.id, token_id = %pair.access_uuid, "User signed in");

    let jar = with_token_cookies(jar, &pair, state.settings().security().cookie_secure);
    Ok((jar, Json(TokenResponse::new(&pair, Some(UserResponse::from_db(user))))))
}

async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let token = extract_token(&headers, REFRESH_TOKEN_COOKIE)
        .ok_or(ApiError::Unauthorized("Refresh token required"))?;

    let claims = tokens::verify_refresh_token(&token, state.settings().security())
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token"))?;

    let user = repositories::users::find_by_id(state.db(), claims.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    let pair = tokens::create_token_pair(&user, state.settings().security())
        .map_err(|e| ApiError::internal(e, "Failed to create tokens"))?;

    tracing::info!(
        user_id = %user.id,
        previous_token_id = %claims.uuid,
        token_id = %pair.refresh_uuid,
        "Token pair refreshed"
    );

    let jar = with_token_cookies(jar, &pair, state.settings().security().cookie_secure);
    Ok((jar, Json(TokenResponse::new(&pair, Some(UserResponse::from_db(user))))))
}

async fn logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE));
    (StatusCode::NO_CONTENT, jar)
}

async fn me(
    State(state): State<AppState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), auth.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    Ok(Json(UserResponse::from_db(user)))
}

/// Host-only, http-only cookies on `/` that live exactly as long as their token.
pub(crate) fn with_token_cookies(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    let now = OffsetDateTime::now_utc();
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        remaining_seconds(pair.access_expires_at, now),
        secure,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token.clone(),
        remaining_seconds(pair.refresh_expires_at, now),
        secure,
    ))
}

fn token_cookie(
    name: &'static str,
    value: String,
    max_age_seconds: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Sent even when the request carried no cookies, so the client always drops both.
fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}
