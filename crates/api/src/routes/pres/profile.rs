//! Organization profile and profile picture.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::storage;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::PresOrg;
use crate::middleware::session::session_cookie;
use orgfin_core::storage::StorageService;
use orgfin_db::OrganizationRepository;
use orgfin_db::repositories::ProfileUpdate;
use orgfin_shared::Role;

/// Creates the profile router (requires the organization session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profile",
            get(get_profile).put(update_profile).post(update_profile),
        )
        .route("/api/profile/picture", post(upload_picture))
}

/// Profile fields an organization may change.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    /// Display name.
    #[serde(default)]
    pub org_name: Option<String>,
    /// Short name or acronym.
    #[serde(default)]
    pub org_short_name: Option<String>,
    /// Department text.
    #[serde(default)]
    pub department: Option<String>,
    /// School text.
    #[serde(default)]
    pub school: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(req: ProfileRequest) -> Self {
        Self {
            org_name: req.org_name.filter(|n| !n.trim().is_empty()),
            org_short_name: req.org_short_name,
            department: req.department,
            school: req.school,
        }
    }
}

/// GET /api/profile
async fn get_profile(State(state): State<AppState>, org: PresOrg) -> ApiResult<Json<Value>> {
    let Some(profile) = OrganizationRepository::new((*state.db).clone())
        .find_by_id(org.organization_id())
        .await?
    else {
        return Err(ApiError::not_found("Organization not found"));
    };

    Ok(Json(json!({
        "org_name": profile.org_name,
        "org_short_name": profile.org_short_name,
        "department": profile.department,
        "school": profile.school,
        "profile_picture": profile.profile_picture,
    })))
}

/// PUT|POST /api/profile - Update the allowed profile fields.
///
/// A new name is also written into the session cookie.
async fn update_profile(
    State(state): State<AppState>,
    org: PresOrg,
    jar: CookieJar,
    Json(payload): Json<ProfileRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let update = ProfileUpdate::from(payload);
    if update.is_empty() {
        return Err(ApiError::bad_request("No valid fields to update"));
    }
    let renamed = update.org_name.is_some();

    let Some(updated) = OrganizationRepository::new((*state.db).clone())
        .update_profile(org.organization_id(), update)
        .await?
    else {
        return Err(ApiError::not_found("Organization not found"));
    };

    let jar = if renamed {
        let token = state
            .jwt_service
            .issue(updated.id, Role::Pres, &updated.org_name)?;
        jar.add(session_cookie(Role::Pres, token, state.secure_cookies))
    } else {
        jar
    };

    info!(org_id = updated.id, "Organization profile updated");
    Ok((
        jar,
        Json(json!({ "success": true, "message": "Profile updated successfully" })),
    ))
}

/// POST /api/profile/picture - Upload a png, jpg, jpeg or gif `photo`.
async fn upload_picture(
    State(state): State<AppState>,
    org: PresOrg,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        photo = Some((filename, content_type, bytes.to_vec()));
    }

    let Some((filename, content_type, bytes)) = photo else {
        return Err(ApiError::bad_request("No file provided"));
    };
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    let key = StorageService::profile_picture_key(org.organization_id(), &filename)
        .map_err(|_| ApiError::bad_request("Invalid file type"))?;

    let storage = storage(&state)?;
    storage.validate_upload(&content_type, u64::try_from(bytes.len()).unwrap_or(u64::MAX))?;
    storage.upload(&key, bytes, &content_type).await?;

    let Some(previous) = OrganizationRepository::new((*state.db).clone())
        .set_profile_picture(org.organization_id(), &key)
        .await?
    else {
        return Err(ApiError::not_found("Organization not found"));
    };

    if let Some(old_key) = previous.filter(|k| *k != key)
        && let Err(e) = storage.delete(&old_key).await
    {
        warn!(error = %e, key = %old_key, "Failed to remove old profile picture");
    }

    let url = storage.object_url(&key, false).await.unwrap_or_default();
    info!(org_id = org.organization_id(), key = %key, "Profile picture uploaded");
    Ok(Json(json!({
        "success": true,
        "message": "Profile picture uploaded successfully",
        "profile_picture": key,
        "url": url,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_ignored() {
        let req: ProfileRequest =
            serde_json::from_value(json!({ "org_name": "  ", "school": "PLMun" })).unwrap();
        let update = ProfileUpdate::from(req);
        assert!(update.org_name.is_none());
        assert_eq!(update.school.as_deref(), Some("PLMun"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_unknown_fields_only_is_empty() {
        let req: ProfileRequest =
            serde_json::from_value(json!({ "username": "hacker" })).unwrap();
        assert!(ProfileUpdate::from(req).is_empty());
    }
}
