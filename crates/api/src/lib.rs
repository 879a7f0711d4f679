//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - OSAS routes under `/osas`
//! - Student organization routes under `/pres`
//! - Cookie session middleware and extractors
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod reports;
pub mod response;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use orgfin_core::storage::StorageService;
use orgfin_shared::{EmailService, JwtService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Signs and checks session tokens.
    pub jwt_service: Arc<JwtService>,
    /// Email service for password reset links (optional).
    pub email_service: Option<Arc<EmailService>>,
    /// Storage service for receipts and profile pictures (optional).
    pub storage: Option<Arc<StorageService>>,
    /// DOCX report template (optional).
    pub report_template: Option<Arc<Vec<u8>>>,
    /// Marks session cookies `Secure`.
    pub secure_cookies: bool,
    /// Returns password reset tokens to the caller.
    pub expose_reset_token: bool,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/osas", routes::osas::routes(state.clone()))
        .nest("/pres", routes::pres::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use orgfin_shared::{JwtConfig, Role};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            db: Arc::new(DatabaseConnection::Disconnected),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "router-test-secret-router-test-secret".into(),
                session_expires_minutes: 60,
            })),
            email_service: None,
            storage: None,
            report_template: None,
            secure_cookies: false,
            expose_reset_token: true,
        }
    }

    fn cookie(state: &AppState, role: Role, sub: i64, name: &str) -> String {
        let token = state.jwt_service.issue(sub, role, name).unwrap();
        format!("{}={token}", role.cookie_name())
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let (status, body) = send(&state, get("/pres/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["api"], "PRES API");
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let state = test_state();

        let (status, body) = send(&state, get("/osas/api/organizations", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not logged in");

        let (status, body) = send(&state, get("/pres/api/wallets", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_sessions_are_not_shared_between_roles() {
        let state = test_state();
        let pres = cookie(&state, Role::Pres, 7, "Math Society");
        let osas = cookie(&state, Role::Osas, 1, "osas_admin");

        let (status, _) = send(&state, get("/osas/api/admin/notifications", Some(&pres))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, get("/pres/api/dashboard/summary", Some(&osas))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_status_reports_each_role() {
        let state = test_state();
        let pres = cookie(&state, Role::Pres, 7, "Math Society");

        let (_, body) = send(&state, get("/pres/api/auth_status", Some(&pres))).await;
        assert_eq!(body, json!({ "loggedin": true, "orgid": 7, "org_name": "Math Society" }));

        let (_, body) = send(&state, get("/osas/api/auth_status", Some(&pres))).await;
        assert_eq!(body, json!({ "logged_in": false, "username": null }));
    }

    #[tokio::test]
    async fn test_pres_logout_only_clears_pres_cookie() {
        let state = test_state();
        let both = format!(
            "{}; {}",
            cookie(&state, Role::Pres, 7, "Math Society"),
            cookie(&state, Role::Osas, 1, "osas_admin")
        );

        let response = create_router(state.clone())
            .oneshot(json_request("POST", "/pres/logout", Some(&both), &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cleared: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cleared.len(), 1);
        assert!(cleared[0].starts_with("pres_session="));
    }

    #[tokio::test]
    async fn test_change_password_validation() {
        let state = test_state();
        let pres = cookie(&state, Role::Pres, 7, "Math Society");

        let (status, body) = send(
            &state,
            json_request("POST", "/pres/change-password", Some(&pres), &json!({ "new_password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please fill out all fields.");

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/pres/change-password",
                Some(&pres),
                &json!({ "new_password": "Secret#123", "confirm_password": "Secret#124" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Passwords do not match.");

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/pres/change-password",
                Some(&pres),
                &json!({ "new_password": "short", "confirm_password": "short" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_without_fields_is_rejected() {
        let state = test_state();
        let pres = cookie(&state, Role::Pres, 7, "Math Society");

        let (status, body) = send(
            &state,
            json_request("PUT", "/pres/api/profile", Some(&pres), &json!({ "status": "Active" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No valid fields to update");
    }

    #[tokio::test]
    async fn test_reset_password_requires_token_and_password() {
        let state = test_state();
        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/osas/api/admin/reset_password",
                None,
                &json!({ "token": "abc", "new_password": "" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid token or password");
    }

    fn photo_upload(cookie: &str, size: usize) -> Request<Body> {
        let boundary = "orgfin-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"logo.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat_n(0u8, size));
        body.extend(format!("\r\n--{boundary}--\r\n").into_bytes());

        Request::builder()
            .method("POST")
            .uri("/pres/api/profile/picture")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_photo_larger_than_two_megabytes_is_read() {
        let state = test_state();
        let pres = cookie(&state, Role::Pres, 7, "Math Society");

        let (status, body) = send(&state, photo_upload(&pres, 3 * 1024 * 1024)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "File storage is not configured");
    }

    #[tokio::test]
    async fn test_upload_limit_follows_storage_setting() {
        use orgfin_core::storage::{StorageConfig, StorageProvider};

        let mut state = test_state();
        let storage = StorageService::from_config(
            StorageConfig::new(StorageProvider::local_fs(std::env::temp_dir(), "Receipts"))
                .with_max_file_size(1024 * 1024),
        )
        .unwrap();
        state.storage = Some(Arc::new(storage));
        let pres = cookie(&state, Role::Pres, 7, "Math Society");

        let (status, body) = send(&state, photo_upload(&pres, 3 * 1024 * 1024)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("too large"));
    }
}
