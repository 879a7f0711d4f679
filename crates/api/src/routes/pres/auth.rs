//! Organization sign-in, sign-out and first-login password change.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::PresOrg;
use crate::middleware::session::{clear_session, session_claims, session_cookie};
use orgfin_core::auth::{hash_password, validate_password_policy, verify_password};
use orgfin_db::OrganizationRepository;
use orgfin_db::entities::organizations::status;
use orgfin_shared::Role;

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login/pres", post(login))
        .route("/api/auth_status", get(auth_status))
        .route("/logout", post(logout).get(logout))
}

/// Routes that need an organization session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/change-password", post(change_password))
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Organization username.
    pub username: String,
    /// Plain password.
    pub password: String,
}

/// Password change form.
#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordRequest {
    /// New password.
    #[serde(default)]
    pub new_password: String,
    /// Repeated new password.
    #[serde(default)]
    pub confirm_password: String,
}

/// POST /login/pres - Sign in an organization.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let Some(org) = OrganizationRepository::new((*state.db).clone())
        .find_by_username(payload.username.trim())
        .await?
    else {
        return Err(ApiError::not_found("Organization not found."));
    };

    if org.status == status::ARCHIVED {
        info!(org_id = org.id, "Login attempt for archived organization");
        return Err(ApiError::forbidden(
            "This organization account is archived. Please contact OSAS.",
        ));
    }

    if !verify_password(&payload.password, &org.password)? {
        info!(org_id = org.id, "Organization login with wrong password");
        return Err(ApiError::unauthorized("Incorrect password."));
    }

    let token = state.jwt_service.issue(org.id, Role::Pres, &org.org_name)?;
    info!(org_id = org.id, "Organization logged in");

    let mut body = json!({
        "success": true,
        "org_id": org.id,
        "org_name": org.org_name,
    });
    if org.must_change_password {
        body["must_change_password"] = json!(true);
    }

    let jar = jar.add(session_cookie(Role::Pres, token, state.secure_cookies));
    Ok((jar, Json(body)))
}

/// GET /api/auth_status
async fn auth_status(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    match session_claims(&state, &jar, Role::Pres) {
        Some(claims) => Json(json!({
            "loggedin": true,
            "orgid": claims.sub,
            "org_name": claims.name,
        })),
        None => Json(json!({ "loggedin": false, "orgid": null, "org_name": null })),
    }
}

/// POST /change-password - Replace the password and clear the
/// must-change flag.
async fn change_password(
    State(state): State<AppState>,
    org: PresOrg,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Response> {
    if payload.new_password.is_empty() || payload.confirm_password.is_empty() {
        return Err(ApiError::bad_request("Please fill out all fields."));
    }
    if payload.new_password != payload.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match."));
    }

    let errors = validate_password_policy(&payload.new_password);
    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "errors": errors })),
        )
            .into_response());
    }

    let hash = hash_password(&payload.new_password)?;
    let found = OrganizationRepository::new((*state.db).clone())
        .change_password(org.organization_id(), &hash)
        .await?;
    if !found {
        return Err(ApiError::not_found("Organization not found"));
    }

    info!(org_id = org.organization_id(), "Organization password changed");
    Ok(Json(json!({ "success": true, "message": "Password changed" })).into_response())
}

/// POST /logout - Sign out the organization, keeping any OSAS session.
async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        clear_session(jar, Role::Pres),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_request_defaults() {
        let req: ChangePasswordRequest =
            serde_json::from_value(json!({ "new_password": "Secret#123" })).unwrap();
        assert_eq!(req.new_password, "Secret#123");
        assert!(req.confirm_password.is_empty());
    }
}
