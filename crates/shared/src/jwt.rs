//! Signed session tokens.
//!
//! Sessions are JWTs kept in HTTP-only cookies, one cookie per role.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Role, SessionClaims};

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Session lifetime in minutes.
    pub session_expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            session_expires_minutes: 720,
        }
    }
}

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token was issued for another role.
    #[error("token issued for a different role")]
    WrongRole,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("session_expires_minutes", &self.config.session_expires_minutes)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new token service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a session token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue(&self, sub: i64, role: Role, name: &str) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.session_expires_minutes);
        let claims = SessionClaims::new(sub, role, name, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and checks that it belongs to `role`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::WrongRole` if it was issued for the other role,
    /// and `JwtError::DecodingError` if it is malformed.
    pub fn validate(&self, token: &str, role: Role) -> Result<SessionClaims, JwtError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if claims.role != role {
            return Err(JwtError::WrongRole);
        }
        Ok(claims)
    }

    /// Session lifetime in seconds, used for the cookie `Max-Age`.
    #[must_use]
    pub const fn session_expires_in(&self) -> i64 {
        self.config.session_expires_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            session_expires_minutes: 15,
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue(42, Role::Pres, "Math Society").unwrap();
        let claims = service.validate(&token, Role::Pres).unwrap();

        assert_eq!(claims.subject(), 42);
        assert_eq!(claims.role, Role::Pres);
        assert_eq!(claims.name, "Math Society");
    }

    #[test]
    fn test_role_mismatch_rejected() {
        let service = create_test_service();
        let token = service.issue(1, Role::Pres, "org").unwrap();
        assert!(matches!(
            service.validate(&token, Role::Osas),
            Err(JwtError::WrongRole)
        ));
    }

    #[test]
    fn test_other_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            session_expires_minutes: 15,
        });
        let token = other.issue(1, Role::Osas, "admin").unwrap();
        assert!(matches!(
            service.validate(&token, Role::Osas),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            session_expires_minutes: -10,
        });
        let token = service.issue(1, Role::Osas, "admin").unwrap();
        assert!(matches!(
            service.validate(&token, Role::Osas),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        assert!(service.validate("invalid.token.here", Role::Osas).is_err());
    }
}
