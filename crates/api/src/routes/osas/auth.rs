//! OSAS sign-in and sign-out.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::record_activity;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::ClientInfo;
use crate::middleware::session::{clear_session, session_claims, session_cookie};
use orgfin_core::auth::verify_password;
use orgfin_db::OsasAdminRepository;
use orgfin_shared::Role;

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin username.
    pub username: String,
    /// Plain password.
    pub password: String,
}

/// Creates the OSAS auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/auth_status", get(auth_status))
}

/// POST /login - Sign in an OSAS admin.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let repo = OsasAdminRepository::new((*state.db).clone());

    let Some(admin) = repo.find_by_username(payload.username.trim()).await? else {
        info!(username = %payload.username, "OSAS login attempt for unknown admin");
        return Err(ApiError::not_found("Admin not found"));
    };

    if !verify_password(&payload.password, &admin.password)? {
        info!(admin_id = admin.id, "OSAS login with wrong password");
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    if !admin.is_active {
        return Err(ApiError::forbidden("This admin account is disabled"));
    }

    let token = state
        .jwt_service
        .issue(admin.id, Role::Osas, &admin.username)?;

    record_activity(
        &state,
        admin.id,
        "login",
        &format!("Admin {} logged in", admin.username),
    )
    .await;

    let client = ClientInfo::from_headers(&headers);
    if let Err(e) = repo
        .record_session(admin.id, &client.device, &client.ip_address)
        .await
    {
        warn!(error = %e, admin_id = admin.id, "Failed to record OSAS session");
    }

    info!(admin_id = admin.id, "OSAS admin logged in");

    let jar = jar.add(session_cookie(Role::Osas, token, state.secure_cookies));
    Ok((
        jar,
        Json(json!({
            "message": "OSAS login successful!",
            "username": admin.username,
        })),
    ))
}

/// POST /logout - Sign out the OSAS admin, keeping any organization session.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<Value>) {
    if let Some(claims) = session_claims(&state, &jar, Role::Osas) {
        record_activity(
            &state,
            claims.sub,
            "logout",
            &format!("Admin {} logged out", claims.name),
        )
        .await;

        let client = ClientInfo::from_headers(&headers);
        if let Err(e) = OsasAdminRepository::new((*state.db).clone())
            .end_sessions(claims.sub, &client.device, &client.ip_address)
            .await
        {
            warn!(error = %e, admin_id = claims.sub, "Failed to close OSAS session");
        }
    }

    (
        clear_session(jar, Role::Osas),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

/// GET /api/auth_status
async fn auth_status(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    match session_claims(&state, &jar, Role::Osas) {
        Some(claims) => Json(json!({ "logged_in": true, "username": claims.name })),
        None => Json(json!({ "logged_in": false, "username": null })),
    }
}
