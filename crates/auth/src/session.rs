use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::{validate_claims, AuthError, SessionClaims};

pub const SESSION_TTL_HOURS: i64 = 24;

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(SESSION_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and time window; returns the claims on success.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        // The time window is checked against `now` below, not the wall clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "session token rejected");
                AuthError::InvalidToken
            })?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn issued_tokens_validate_within_the_window() {
        let tokens = SessionTokens::new("secret");
        let token = tokens.issue("admin", t0()).unwrap();
        let claims = tokens.validate(&token, t0() + Duration::hours(1)).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let tokens = SessionTokens::new("secret");
        let token = tokens.issue("admin", t0()).unwrap();
        assert_eq!(
            tokens.validate(&token, t0() + Duration::hours(24)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn foreign_signatures_and_garbage_are_rejected() {
        let ours = SessionTokens::new("secret");
        let theirs = SessionTokens::new("other-secret");
        let token = theirs.issue("admin", t0()).unwrap();
        assert_eq!(ours.validate(&token, t0()), Err(AuthError::InvalidToken));
        assert_eq!(ours.validate("not-a-jwt", t0()), Err(AuthError::InvalidToken));
    }
}
