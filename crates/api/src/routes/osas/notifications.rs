//! Submission notifications for OSAS.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::success;
use orgfin_db::repositories::{NotificationRepository, has_unread};

/// Creates the notifications router (requires the OSAS session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/notifications", get(list_notifications))
        .route(
            "/api/admin/notifications/{notification_id}/read",
            post(mark_read),
        )
}

/// GET /api/admin/notifications - Latest notifications and the unread flag.
async fn list_notifications(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let notifications = NotificationRepository::new((*state.db).clone())
        .latest()
        .await?;
    let unread = has_unread(&notifications);
    Ok(Json(
        json!({ "notifications": notifications, "has_unread": unread }),
    ))
}

/// POST `/api/admin/notifications/{notification_id}/read`
async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let found = NotificationRepository::new((*state.db).clone())
        .mark_read(notification_id)
        .await?;
    if !found {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(success())
}
