//! Health check endpoint of the organization API.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// API name.
    pub api: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        api: "PRES API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
