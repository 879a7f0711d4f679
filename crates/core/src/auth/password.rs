//! Password hashing with Argon2id and the organization password policy.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum length accepted by [`validate_password_policy`].
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use orgfin_core::auth::hash_password;
///
/// let hash = hash_password("Str0ng!pass").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a PHC hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash format is invalid.
/// Returns `PasswordError::VerifyError` if verification fails unexpectedly.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a new organization password against the policy.
///
/// Returns one message per unmet rule; an empty list means the password is accepted.
#[must_use]
pub fn validate_password_policy(password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long."
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number.".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        errors.push("Password must contain at least one special character.".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "test_password_123!");
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "plain-text-password");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_policy_accepts_strong_password() {
        assert!(validate_password_policy("Sup3r$ecret").is_empty());
    }

    #[rstest]
    #[case("Ab1!", "at least 8")]
    #[case("ABCDEFG1!", "lowercase")]
    #[case("abcdefg1!", "uppercase")]
    #[case("Abcdefgh!", "number")]
    #[case("Abcdefgh1", "special")]
    fn test_policy_reports_each_rule(#[case] password: &str, #[case] fragment: &str) {
        let errors = validate_password_policy(password);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains(fragment));
    }

    #[test]
    fn test_policy_reports_all_failures() {
        assert_eq!(validate_password_policy("").len(), 5);
    }
}
