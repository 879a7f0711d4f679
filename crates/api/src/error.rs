//! Conversion of domain and database errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orgfin_core::auth::PasswordError;
use orgfin_core::document::TemplateError;
use orgfin_core::reports::SubmissionError;
use orgfin_core::storage::StorageError;
use orgfin_db::repositories::OrganizationError;
use orgfin_shared::{AppError, JwtError};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by route handlers.
///
/// Renders as `{"error": message, "code": CODE}` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// 400 with a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// 401 with a message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 403 with a message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(AppError::Forbidden(message.into()))
    }

    /// 404 with a message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }

    /// 503 with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self(AppError::Unavailable(message.into()))
    }

    /// 500; the detail is logged, never returned.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self(AppError::Internal(detail.into()))
    }

    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = Json(json!({
            "error": self.0.public_message(),
            "code": self.0.error_code(),
        }));
        (self.status(), body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<TemplateError> for ApiError {
    fn from(err: TemplateError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::not_found("Not found"),
            e if e.is_client_error() => Self::bad_request(e.to_string()),
            e => Self(AppError::ExternalService(e.to_string())),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::NoPendingReport => Self::not_found("No pending report"),
            SubmissionError::Store(detail) => Self(AppError::Database(detail)),
        }
    }
}

impl From<OrganizationError> for ApiError {
    fn from(err: OrganizationError) -> Self {
        match err {
            OrganizationError::Duplicate => Self::bad_request(err.to_string()),
            OrganizationError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let (status, body) = body_json(ApiError::not_found("Organization not found.")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Organization not found.");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_database_error_is_hidden() {
        let err: ApiError = DbErr::Custom("connection refused".into()).into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[test]
    fn test_submission_errors() {
        let err: ApiError = SubmissionError::NoPendingReport.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: ApiError = SubmissionError::Store("boom".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_organization_is_bad_request() {
        let err: ApiError = OrganizationError::Duplicate.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.0.public_message(),
            "Organization name or username already exists"
        );
    }

    #[test]
    fn test_storage_errors() {
        let err: ApiError = StorageError::NotFound { key: "a".into() }.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: ApiError = StorageError::InvalidExtension("a.svg".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = StorageError::LinkUnavailable.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
