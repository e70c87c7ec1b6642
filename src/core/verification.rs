use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;
use time::{Duration, PrimitiveDateTime};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub(crate) const CODE_LENGTH: usize = 6;
pub(crate) const DEFAULT_CODE_TTL_SECONDS: u64 = 600;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum VerificationError {
    #[error("No pending verification code")]
    NoPendingCode,
    #[error("Invalid verification code")]
    Mismatch,
    #[error("Verification code has expired")]
    Expired,
}

impl VerificationError {
    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            Self::NoPendingCode => "no_pending_code",
            Self::Mismatch => "mismatch",
            Self::Expired => "expired",
        }
    }
}

/// Six characters drawn uniformly from `A-Z0-9`.
pub(crate) fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Accepts `submitted` only when it equals the stored code and no more than
/// `ttl_seconds` have elapsed since the code was issued.
pub(crate) fn check_code(
    stored_code: Option<&str>,
    issued_at: Option<PrimitiveDateTime>,
    submitted: &str,
    now: PrimitiveDateTime,
    ttl_seconds: u64,
) -> Result<(), VerificationError> {
    let (Some(stored_code), Some(issued_at)) = (stored_code, issued_at) else {
        return Err(VerificationError::NoPendingCode);
    };

    if stored_code != submitted.trim() {
        return Err(VerificationError::Mismatch);
    }

    if now - issued_at > Duration::seconds(ttl_seconds as i64) {
        return Err(VerificationError::Expired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    const TTL: u64 = DEFAULT_CODE_TTL_SECONDS;

    #[test]
    fn generated_codes_use_the_charset() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|byte| CODE_CHARSET.contains(&byte)), "bad code {code}");
        }
    }

    #[test]
    fn code_is_valid_up_to_the_window_edge() {
        let issued = primitive_now_utc();
        let at_edge = issued + Duration::seconds(TTL as i64);

        assert_eq!(check_code(Some("AB12CD"), Some(issued), "AB12CD", at_edge, TTL), Ok(()));
    }

    #[test]
    fn code_expires_one_second_after_the_window() {
        let issued = primitive_now_utc();
        let late = issued + Duration::seconds(TTL as i64 + 1);

        assert_eq!(
            check_code(Some("AB12CD"), Some(issued), "AB12CD", late, TTL),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn mismatch_is_reported_before_expiry() {
        let issued = primitive_now_utc();
        let late = issued + Duration::hours(1);

        assert_eq!(
            check_code(Some("AB12CD"), Some(issued), "AB12CE", late, TTL),
            Err(VerificationError::Mismatch)
        );
        assert_eq!(
            check_code(Some("AB12CD"), Some(issued), "ab12cd", issued, TTL),
            Err(VerificationError::Mismatch)
        );
    }

    #[test]
    fn consumed_code_cannot_be_reused() {
        let now = primitive_now_utc();
        assert_eq!(
            check_code(None, None, "AB12CD", now, TTL),
            Err(VerificationError::NoPendingCode)
        );
    }
}
