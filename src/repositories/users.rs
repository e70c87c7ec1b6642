use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, username, email, hashed_password, role, verification_code, \
    verification_code_created_at, is_verified, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Which of the unique identity columns are already taken.
pub(crate) async fn find_identity_conflict(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<IdentityConflict>, sqlx::Error> {
    let email_taken: Option<bool> = sqlx::query_scalar(
        "SELECT lower(email) = lower($2)
         FROM users
         WHERE username = $1 OR lower(email) = lower($2)
         ORDER BY 1 DESC
         LIMIT 1",
    )
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(email_taken.map(|email_taken| {
        if email_taken {
            IdentityConflict::Email
        } else {
            IdentityConflict::Username
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdentityConflict {
    Email,
    Username,
}

pub(crate) struct CreateUser<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    pub role: UserRole,
    pub verification_code: Option<&'a str>,
    pub is_verified: bool,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    let code_created_at = params.verification_code.map(|_| params.created_at);

    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, username, email, hashed_password, role, verification_code,
            verification_code_created_at, is_verified, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.username)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.verification_code)
    .bind(code_created_at)
    .bind(params.is_verified)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Replaces any pending code. Only unverified accounts are touched.
pub(crate) async fn set_verification_code(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    issued_at: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET verification_code = $1, verification_code_created_at = $2, updated_at = $2
         WHERE id = $3 AND is_verified = FALSE",
    )
    .bind(code)
    .bind(issued_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Consumes `code` and marks the user verified. The WHERE clause makes the code
/// single-use even when two requests race.
pub(crate) async fn mark_verified(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET is_verified = TRUE,
             verification_code = NULL,
             verification_code_created_at = NULL,
             updated_at = $1
         WHERE id = $2 AND verification_code = $3",
    )
    .bind(now)
    .bind(id)
    .bind(code)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn find_role_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<UserRole>, sqlx::Error> {
    sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Brings an existing account in line with its seeded role and password and marks it
/// verified. Any pending code is dropped.
pub(crate) async fn apply_seed(
    pool: &PgPool,
    id: Uuid,
    hashed_password: &str,
    role: UserRole,
    now: PrimitiveDateTime,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET hashed_password = $1,
             role = $2,
             is_verified = TRUE,
             verification_code = NULL,
             verification_code_created_at = NULL,
             updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(hashed_password)
    .bind(role)
    .bind(now)
    .bind(id)
    .fetch_one(pool)
    .await
}
