//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error, including duplicate names and usernames.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required service (storage, report template) is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message shown to clients.
    ///
    /// Server-side failures never leak their detail.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::Unavailable(m) => m,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => {
                "An internal error occurred"
            }
        }
    }

    /// Returns true for errors caused by the server rather than the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Unavailable(String::new()), 503, "SERVICE_UNAVAILABLE")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::ExternalService(String::new()), 500, "EXTERNAL_SERVICE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_public_message_hides_server_detail() {
        let err = AppError::Database("relation \"wallets\" does not exist".into());
        assert_eq!(err.public_message(), "An internal error occurred");
        assert!(err.is_server_error());

        let err = AppError::NotFound("Organization not found".into());
        assert_eq!(err.public_message(), "Organization not found");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Forbidden("msg".into()).to_string(),
            "Access denied: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
    }
}
