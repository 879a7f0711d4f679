//! OSAS account settings: profile, password, activity and password reset.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::record_activity;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::OsasAdmin;
use crate::middleware::session::session_cookie;
use crate::response::message;
use crate::routes::parse_date;
use orgfin_core::auth::{hash_password, verify_password};
use orgfin_db::entities::{osas_activity_log, osas_admins};
use orgfin_db::repositories::{ActivityFilter, AdminProfileUpdate, OsasAdminRepository};
use orgfin_shared::Role;

/// Creates the settings router (requires the OSAS session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/profile", get(get_profile).put(update_profile))
        .route("/api/admin/password", post(change_password))
        .route("/api/admin/activity", get(list_activity))
        .route("/api/admin/sessions", get(list_sessions))
}

/// Creates the password reset router, reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/request_password_reset",
            post(request_password_reset),
        )
        .route("/api/admin/reset_password", post(reset_password))
}

/// Profile edit form. Blank fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    /// New username.
    #[serde(default)]
    pub username: Option<String>,
    /// New display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Password change form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// Activity log filter.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Action type, or `all`.
    #[serde(rename = "type")]
    pub action_type: Option<String>,
    /// Day, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Reset token request.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// Admin username.
    pub username: String,
}

/// Password reset with a token.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Token from the reset request.
    pub token: String,
    /// New password.
    #[serde(default)]
    pub new_password: String,
}

fn repo(state: &AppState) -> OsasAdminRepository {
    OsasAdminRepository::new((*state.db).clone())
}

async fn current_admin(state: &AppState, admin: &OsasAdmin) -> ApiResult<osas_admins::Model> {
    repo(state)
        .find_by_id(admin.admin_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))
}

/// GET /api/admin/profile
async fn get_profile(State(state): State<AppState>, admin: OsasAdmin) -> ApiResult<Json<Value>> {
    let admin = current_admin(&state, &admin).await?;
    Ok(Json(json!({
        "username": admin.username,
        "full_name": admin.full_name,
        "email": admin.email,
    })))
}

/// PUT /api/admin/profile - Update the profile, auditing each changed field.
///
/// A username change re-issues the session cookie under the new name.
async fn update_profile(
    State(state): State<AppState>,
    session: OsasAdmin,
    jar: CookieJar,
    Json(payload): Json<ProfileRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let admin = current_admin(&state, &session).await?;
    let repo = repo(&state);

    let username = payload
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if let Some(new_name) = username.as_deref().filter(|u| *u != admin.username)
        && repo.username_taken(new_name, admin.id).await?
    {
        return Err(ApiError::bad_request("Username already exists."));
    }

    let (updated, changed) = repo
        .update_profile(
            admin,
            AdminProfileUpdate {
                username,
                full_name: payload.full_name,
                email: payload.email,
            },
        )
        .await?;

    let mut fields = Map::new();
    for field in &changed {
        let value = match *field {
            "username" => json!(updated.username),
            "full_name" => json!(updated.full_name),
            "email" => json!(updated.email),
            _ => continue,
        };
        fields.insert((*field).to_string(), value);
    }

    record_activity(&state, updated.id, "settings", "Profile updated").await;

    let jar = if changed.contains(&"username") {
        let token = state
            .jwt_service
            .issue(updated.id, Role::Osas, &updated.username)?;
        jar.add(session_cookie(Role::Osas, token, state.secure_cookies))
    } else {
        jar
    };

    info!(admin_id = updated.id, changed = ?changed, "OSAS profile updated");
    Ok((
        jar,
        Json(json!({ "message": "Profile updated!", "updated": fields })),
    ))
}

/// POST /api/admin/password
async fn change_password(
    State(state): State<AppState>,
    session: OsasAdmin,
    Json(payload): Json<PasswordRequest>,
) -> ApiResult<Json<Value>> {
    let admin = current_admin(&state, &session).await?;

    if !verify_password(&payload.current_password, &admin.password)? {
        return Err(ApiError::bad_request("Current password incorrect"));
    }
    if payload.new_password.is_empty() {
        return Err(ApiError::bad_request("New password is required"));
    }

    let repo = repo(&state);
    repo.set_password(admin.id, &hash_password(&payload.new_password)?)
        .await?;
    repo.log_audit(admin.id, "password", None, Some("[UPDATED]".to_string()))
        .await?;
    record_activity(&state, admin.id, "security", "Changed password").await;

    info!(admin_id = admin.id, "OSAS password changed");
    Ok(message("Password changed"))
}

/// GET /api/admin/activity?type=&date= - The 50 latest matching entries.
async fn list_activity(
    State(state): State<AppState>,
    session: OsasAdmin,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<osas_activity_log::Model>>> {
    let filter = ActivityFilter {
        action_type: query.action_type,
        date: parse_date(query.date.as_deref())?,
    };
    let entries = repo(&state)
        .list_activity(session.admin_id(), &filter)
        .await?;
    Ok(Json(entries))
}

/// GET /api/admin/sessions
async fn list_sessions(
    State(state): State<AppState>,
    session: OsasAdmin,
) -> ApiResult<Json<Value>> {
    let sessions = repo(&state).list_sessions(session.admin_id()).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// POST /api/admin/request_password_reset - Issue a one-hour reset token.
///
/// The token is emailed when mail is configured and the admin has an address.
async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<Value>> {
    let repo = repo(&state);
    let Some(admin) = repo.find_by_username(payload.username.trim()).await? else {
        return Err(ApiError::not_found("Admin not found"));
    };

    let token = repo.create_reset_token(admin.id).await?;

    if let (Some(email), Some(address)) = (&state.email_service, admin.email.as_deref()) {
        if let Err(e) = email
            .send_password_reset(address, &admin.username, &token)
            .await
        {
            warn!(error = %e, admin_id = admin.id, "Failed to send password reset email");
        }
    }

    if state.expose_reset_token {
        warn!(admin_id = admin.id, "Password reset token returned to an unauthenticated caller");
    } else {
        info!(admin_id = admin.id, "Password reset token issued");
    }
    Ok(Json(reset_token_response(&token, state.expose_reset_token)))
}

fn reset_token_response(token: &str, expose: bool) -> Value {
    if expose {
        json!({ "message": "Password reset token generated", "token": token })
    } else {
        json!({ "message": "Password reset token generated" })
    }
}

/// POST /api/admin/reset_password - Consume a reset token.
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    if payload.token.trim().is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::bad_request("Invalid token or password"));
    }

    let hash = hash_password(&payload.new_password)?;
    let Some(admin_id) = repo(&state)
        .reset_password(payload.token.trim(), &hash, Utc::now())
        .await?
    else {
        return Err(ApiError::bad_request("Invalid token or password"));
    };

    record_activity(&state, admin_id, "security", "Password reset via token").await;

    info!(admin_id, "OSAS password reset via token");
    Ok(message("Password reset successful"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_token_can_be_withheld() {
        let shown = reset_token_response("abc123", true);
        assert_eq!(shown["token"], "abc123");

        let hidden = reset_token_response("abc123", false);
        assert!(hidden.get("token").is_none());
        assert_eq!(hidden["message"], "Password reset token generated");
    }

    #[test]
    fn test_password_request_is_camel_case() {
        let req: PasswordRequest = serde_json::from_value(json!({
            "currentPassword": "old",
            "newPassword": "new",
        }))
        .unwrap();
        assert_eq!(req.current_password, "old");
        assert_eq!(req.new_password, "new");
    }

    #[test]
    fn test_activity_query_reads_type() {
        let query: ActivityQuery =
            serde_json::from_value(json!({ "type": "login", "date": "2025-09-01" })).unwrap();
        assert_eq!(query.action_type.as_deref(), Some("login"));
    }

    #[test]
    fn test_reset_password_defaults_to_empty_password() {
        let req: ResetPasswordRequest =
            serde_json::from_value(json!({ "token": "abc" })).unwrap();
        assert!(req.new_password.is_empty());
    }
}
