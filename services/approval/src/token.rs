//! Approval token generation and validation
//!
//! Tokens are single-use, time-limited credentials that let a client
//! contact approve or reject one specific time entry without logging in.
//! Validation here is pure; the repository re-checks the same conditions at
//! commit time with a conditional update, so a token that passes `validate`
//! can still lose a race and come back as already used.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use thiserror::Error;

/// Bytes of entropy per token; hex-encoding doubles the character count
pub const TOKEN_BYTES: usize = 24;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Why a token is no longer acceptable
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// The token was consumed by an earlier decision
    #[error("token already used")]
    AlreadyUsed,

    /// The token lapsed before use
    #[error("token expired")]
    Expired,
}

/// Generate a new approval token from the OS random number generator
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Token lifetime, overridable through `APPROVAL_TOKEN_TTL_SECONDS`
pub fn token_ttl() -> Duration {
    let seconds = std::env::var("APPROVAL_TOKEN_TTL_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
    Duration::seconds(seconds)
}

/// Check that a token is still usable.
///
/// A consumed token reports `AlreadyUsed` even when it has also expired;
/// "this was already handled" is the more useful answer.
pub fn validate(used: bool, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), TokenError> {
    if used {
        return Err(TokenError::AlreadyUsed);
    }
    if now > expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn generated_tokens_are_hex_of_the_right_length() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn fresh_token_validates() {
        let now = Utc::now();
        assert_eq!(validate(false, now + Duration::hours(24), now), Ok(()));
    }

    #[test]
    fn used_token_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate(true, now + Duration::hours(24), now),
            Err(TokenError::AlreadyUsed)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate(false, now - Duration::seconds(1), now),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn token_expiring_exactly_now_is_still_valid() {
        let now = Utc::now();
        assert_eq!(validate(false, now, now), Ok(()));
    }

    #[test]
    fn used_wins_over_expired() {
        let now = Utc::now();
        assert_eq!(
            validate(true, now - Duration::hours(1), now),
            Err(TokenError::AlreadyUsed)
        );
    }

    #[test]
    #[serial]
    fn token_ttl_defaults_to_24_hours() {
        unsafe {
            std::env::remove_var("APPROVAL_TOKEN_TTL_SECONDS");
        }
        assert_eq!(token_ttl(), Duration::hours(24));
    }

    #[test]
    #[serial]
    fn token_ttl_reads_the_environment() {
        unsafe {
            std::env::set_var("APPROVAL_TOKEN_TTL_SECONDS", "3600");
        }
        assert_eq!(token_ttl(), Duration::hours(1));
        unsafe {
            std::env::remove_var("APPROVAL_TOKEN_TTL_SECONDS");
        }
    }
}
