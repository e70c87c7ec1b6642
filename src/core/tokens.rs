use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::core::config::SecuritySettings;
use crate::db::models::User;
use crate::db::types::UserRole;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub(crate) const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("token encoding failed")]
    Encoding,
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AccessClaims {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) uuid: Uuid,
    pub(crate) exp: i64,
    pub(crate) iat: i64,
    pub(crate) iss: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RefreshClaims {
    pub(crate) user_id: Uuid,
    pub(crate) uuid: Uuid,
    pub(crate) exp: i64,
    pub(crate) iat: i64,
    pub(crate) iss: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenPair {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) access_uuid: Uuid,
    pub(crate) refresh_uuid: Uuid,
    pub(crate) access_expires_at: OffsetDateTime,
    pub(crate) refresh_expires_at: OffsetDateTime,
}

pub(crate) fn create_token_pair(
    user: &User,
    security: &SecuritySettings,
) -> Result<TokenPair, TokenError> {
    create_token_pair_at(user, security, OffsetDateTime::now_utc())
}

pub(crate) fn create_token_pair_at(
    user: &User,
    security: &SecuritySettings,
    now: OffsetDateTime,
) -> Result<TokenPair, TokenError> {
    let access_expires_at = now + Duration::minutes(security.access_token_expire_minutes as i64);
    let refresh_expires_at = now + Duration::days(security.refresh_token_expire_days as i64);

    let access = AccessClaims {
        user_id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        uuid: Uuid::new_v4(),
        exp: access_expires_at.unix_timestamp(),
        iat: now.unix_timestamp(),
        iss: security.jwt_issuer.clone(),
    };
    let refresh = RefreshClaims {
        user_id: user.id,
        uuid: Uuid::new_v4(),
        exp: refresh_expires_at.unix_timestamp(),
        iat: now.unix_timestamp(),
        iss: security.jwt_issuer.clone(),
    };

    Ok(TokenPair {
        access_token: sign(&access, &security.access_token_secret)?,
        refresh_token: sign(&refresh, &security.refresh_token_secret)?,
        access_uuid: access.uuid,
        refresh_uuid: refresh.uuid,
        access_expires_at,
        refresh_expires_at,
    })
}

pub(crate) fn verify_access_token(
    token: &str,
    security: &SecuritySettings,
) -> Result<AccessClaims, TokenError> {
    verify(token, &security.access_token_secret, &security.jwt_issuer)
}

pub(crate) fn verify_refresh_token(
    token: &str,
    security: &SecuritySettings,
) -> Result<RefreshClaims, TokenError> {
    verify(token, &security.refresh_token_secret, &security.jwt_issuer)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    encode(&Header::new(ALGORITHM), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|err| {
            tracing::error!(error = %err, "Failed to sign token");
            TokenError::Encoding
        })
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, TokenError> {
    // Only HS256 is accepted; the header algorithm is never negotiated.
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iat", "iss"]);

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|err| {
            tracing::debug!(error = %err, "Token rejected");
            TokenError::Invalid
        })
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;
    use crate::test_support;

    fn security() -> SecuritySettings {
        SecuritySettings {
            access_token_secret: "access-secret-for-tests".to_string(),
            refresh_token_secret: "refresh-secret-for-tests".to_string(),
            access_token_expire_minutes: 15,
            refresh_token_expire_days: 7,
            jwt_issuer: "learning-management-system".to_string(),
            cookie_secure: false,
        }
    }

    #[test]
    fn access_token_roundtrip_recovers_identity() {
        let security = security();
        let user = test_support::sample_user(UserRole::Professor);

        let pair = create_token_pair(&user, &security).expect("pair");
        let claims = verify_access_token(&pair.access_token, &security).expect("claims");

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, UserRole::Professor);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.iss, "learning-management-system");
        assert!(!claims.uuid.is_nil());
        assert_eq!(claims.uuid, pair.access_uuid);
    }

    #[test]
    fn lifetimes_are_fifteen_minutes_and_seven_days() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let now = OffsetDateTime::now_utc();

        let pair = create_token_pair_at(&user, &security, now).expect("pair");
        let access = verify_access_token(&pair.access_token, &security).expect("access");
        let refresh = verify_refresh_token(&pair.refresh_token, &security).expect("refresh");

        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
        assert_eq!(refresh.user_id, user.id);
    }

    #[test]
    fn every_token_gets_a_fresh_unique_id() {
        let security = security();
        let user = test_support::sample_user(UserRole::Ta);

        let first = create_token_pair(&user, &security).expect("first");
        let second = create_token_pair(&user, &security).expect("second");

        assert_ne!(first.access_uuid, first.refresh_uuid);
        assert_ne!(first.access_uuid, second.access_uuid);
        assert_ne!(first.refresh_uuid, second.refresh_uuid);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let issued = OffsetDateTime::now_utc() - Duration::minutes(16);

        let pair = create_token_pair_at(&user, &security, issued).expect("pair");

        assert!(matches!(
            verify_access_token(&pair.access_token, &security),
            Err(TokenError::Invalid)
        ));
        // The refresh token from the same pair is still inside its window.
        assert!(verify_refresh_token(&pair.refresh_token, &security).is_ok());
    }

    #[test]
    fn token_classes_do_not_cross_verify() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let pair = create_token_pair(&user, &security).expect("pair");

        assert!(verify_refresh_token(&pair.access_token, &security).is_err());
        assert!(verify_access_token(&pair.refresh_token, &security).is_err());
    }

    #[test]
    fn tampered_claims_fail_signature_check() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let pair = create_token_pair(&user, &security).expect("pair");

        let parts: Vec<&str> = pair.access_token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.decode(parts[1]).expect("payload");
        let mut claims: serde_json::Value = serde_json::from_slice(&payload).expect("json");
        claims["role"] = serde_json::json!("professor");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("json"));
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(verify_access_token(&forged, &security).is_err());
    }

    #[test]
    fn foreign_algorithm_and_issuer_are_rejected() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let now = OffsetDateTime::now_utc();
        let claims = AccessClaims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            uuid: Uuid::new_v4(),
            exp: (now + Duration::minutes(5)).unix_timestamp(),
            iat: now.unix_timestamp(),
            iss: security.jwt_issuer.clone(),
        };

        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(security.access_token_secret.as_bytes()),
        )
        .expect("hs512 token");
        assert!(verify_access_token(&hs512, &security).is_err());

        let other_issuer = AccessClaims { iss: "someone-else".to_string(), ..claims };
        let token = sign(&other_issuer, &security.access_token_secret).expect("token");
        assert!(verify_access_token(&token, &security).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let security = security();
        let user = test_support::sample_user(UserRole::Student);
        let pair = create_token_pair(&user, &security).expect("pair");

        let rotated = SecuritySettings {
            access_token_secret: "a-different-access-secret".to_string(),
            ..security
        };
        assert!(verify_access_token(&pair.access_token, &rotated).is_err());
    }
}
