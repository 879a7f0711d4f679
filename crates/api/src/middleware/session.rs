//! Cookie session middleware for the OSAS and organization areas.
//!
//! Each role has its own cookie, so an OSAS admin and an organization can be
//! signed in from the same browser and signing out of one keeps the other.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap,
        header::USER_AGENT,
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;
use orgfin_shared::{Role, SessionClaims};

/// Builds the session cookie for a role.
#[must_use]
pub fn session_cookie(role: Role, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((role.cookie_name(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removes only the given role's session cookie from the jar.
#[must_use]
pub fn clear_session(jar: CookieJar, role: Role) -> CookieJar {
    jar.remove(Cookie::build(role.cookie_name()).path("/"))
}

/// Reads and validates the session cookie of `role`.
pub fn session_claims(state: &AppState, jar: &CookieJar, role: Role) -> Option<SessionClaims> {
    let token = jar.get(role.cookie_name())?;
    match state.jwt_service.validate(token.value(), role) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!(error = %e, role = %role, "Rejected session cookie");
            None
        }
    }
}

/// Requires a valid OSAS session.
///
/// Stores [`OsasAdmin`] in the request extensions.
pub async fn require_osas(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match session_claims(&state, &jar, Role::Osas) {
        Some(claims) => {
            request.extensions_mut().insert(OsasAdmin(claims));
            next.run(request).await
        }
        None => ApiError::unauthorized("Not logged in").into_response(),
    }
}

/// Requires a valid organization session.
///
/// Stores [`PresOrg`] in the request extensions.
pub async fn require_pres(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match session_claims(&state, &jar, Role::Pres) {
        Some(claims) => {
            request.extensions_mut().insert(PresOrg(claims));
            next.run(request).await
        }
        None => ApiError::unauthorized("Unauthorized").into_response(),
    }
}

/// The signed-in OSAS admin.
#[derive(Debug, Clone)]
pub struct OsasAdmin(pub SessionClaims);

impl OsasAdmin {
    /// Admin ID.
    #[must_use]
    pub const fn admin_id(&self) -> i64 {
        self.0.sub
    }

    /// Admin username at sign-in.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0.name
    }
}

impl<S> FromRequestParts<S> for OsasAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not logged in"))
    }
}

/// The signed-in student organization.
#[derive(Debug, Clone)]
pub struct PresOrg(pub SessionClaims);

impl PresOrg {
    /// Organization ID.
    #[must_use]
    pub const fn organization_id(&self) -> i64 {
        self.0.sub
    }

    /// Organization name at sign-in.
    #[must_use]
    pub fn org_name(&self) -> &str {
        &self.0.name
    }
}

impl<S> FromRequestParts<S> for PresOrg
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

/// Device and address of the caller, as recorded on OSAS sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// User agent string.
    pub device: String,
    /// Client IP address, `Unknown` when no proxy header is present.
    pub ip_address: String,
}

impl ClientInfo {
    /// Reads the user agent and the forwarded client address.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let device = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .or_else(|| header("x-real-ip"))
            .unwrap_or("Unknown")
            .to_string();

        Self { device, ip_address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_info_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Firefox"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.7, 172.16.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.1"));

        let info = ClientInfo::from_headers(&headers);
        assert_eq!(info.device, "Firefox");
        assert_eq!(info.ip_address, "10.0.0.7");
    }

    #[test]
    fn test_client_info_defaults() {
        let info = ClientInfo::from_headers(&HeaderMap::new());
        assert_eq!(info.device, "");
        assert_eq!(info.ip_address, "Unknown");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(Role::Pres, "token".into(), true);
        assert_eq!(cookie.name(), "pres_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
