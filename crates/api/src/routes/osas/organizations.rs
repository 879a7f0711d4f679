//! Organization account management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::record_activity;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::OsasAdmin;
use crate::response::{date_opt, message};
use crate::routes::{parse_date, today};
use orgfin_core::auth::{
    DEFAULT_GENERATED_PASSWORD_LENGTH, generate_password, generate_username, hash_password,
};
use orgfin_db::entities::organizations::status;
use orgfin_db::repositories::{
    DepartmentRepository, FinancialReportRepository, NewOrganization, OrganizationListing,
    OrganizationRepository, OrganizationUpdate, OsasAdminRepository,
};

/// Creates the organizations router (requires the OSAS session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/organizations", get(list_active))
        .route(
            "/api/organizations_with_reports",
            get(list_with_reports),
        )
        .route("/api/archived_organizations", get(list_archived))
        .route("/add_organization", post(add_organization))
        .route(
            "/api/organizations/{org_id}",
            axum::routing::put(update_organization).delete(archive_organization),
        )
        .route(
            "/api/organizations/{org_id}/restore",
            patch(restore_organization),
        )
        .route(
            "/api/archive/organizations/{org_id}",
            delete(delete_organization),
        )
        .route("/api/archive/empty", delete(empty_archive))
        .route("/api/departments", get(list_departments))
}

/// Department filter.
#[derive(Debug, Default, Deserialize)]
pub struct DepartmentQuery {
    /// Department name; `All Departments` or absent means every department.
    pub department: Option<String>,
}

/// New organization form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrganizationRequest {
    /// Display name.
    pub org_name: String,
    /// Username; generated when absent.
    #[serde(default)]
    pub username: Option<String>,
    /// Initial password; generated when absent.
    #[serde(default)]
    pub password: Option<String>,
    /// Accreditation date, `YYYY-MM-DD`.
    #[serde(default)]
    pub accreditation_date: Option<String>,
    /// Department.
    #[serde(default, rename = "department_id")]
    pub department_id: Option<i64>,
}

/// Organization edit form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    /// New display name.
    #[serde(default)]
    pub org_name: Option<String>,
    /// New username.
    #[serde(default)]
    pub username: Option<String>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
    /// New accreditation date.
    #[serde(default)]
    pub accreditation_date: Option<String>,
    /// New department.
    #[serde(default, rename = "department_id")]
    pub department_id: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn listing_json(listing: &OrganizationListing) -> Value {
    let org = &listing.organization;
    json!({
        "id": org.id,
        "name": org.org_name,
        "department": listing.department_name.as_deref().unwrap_or("-"),
        "username": org.username,
        "date": date_opt(org.accreditation_date),
        "status": org.status,
        "created_by": org.created_by,
    })
}

async fn list_by_status(
    state: &AppState,
    org_status: &str,
    department: Option<&str>,
) -> ApiResult<Vec<OrganizationListing>> {
    Ok(OrganizationRepository::new((*state.db).clone())
        .list_by_status(org_status, department)
        .await?)
}

/// GET /api/organizations - Active organizations.
async fn list_active(
    State(state): State<AppState>,
    Query(query): Query<DepartmentQuery>,
) -> ApiResult<Json<Value>> {
    let orgs = list_by_status(&state, status::ACTIVE, query.department.as_deref()).await?;
    let orgs: Vec<Value> = orgs.iter().map(listing_json).collect();
    Ok(Json(json!({ "organizations": orgs })))
}

/// GET /api/organizations_with_reports - Active organizations and their master reports.
async fn list_with_reports(
    State(state): State<AppState>,
    Query(query): Query<DepartmentQuery>,
) -> ApiResult<Json<Value>> {
    let orgs = list_by_status(&state, status::ACTIVE, query.department.as_deref()).await?;
    let ids = orgs.iter().map(|o| o.organization.id).collect();
    let reports = FinancialReportRepository::new((*state.db).clone())
        .list_master_for(ids)
        .await?;

    let orgs: Vec<Value> = orgs.iter().map(listing_json).collect();
    Ok(Json(json!({ "organizations": orgs, "reports": reports })))
}

/// GET /api/archived_organizations
async fn list_archived(
    State(state): State<AppState>,
    Query(query): Query<DepartmentQuery>,
) -> ApiResult<Json<Value>> {
    let orgs = list_by_status(&state, status::ARCHIVED, query.department.as_deref()).await?;
    let orgs: Vec<Value> = orgs.iter().map(listing_json).collect();
    Ok(Json(json!({ "organizations": orgs })))
}

/// POST /add_organization - Create an organization account.
///
/// The plain password is returned once so OSAS can hand it over.
async fn add_organization(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Json(payload): Json<AddOrganizationRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let org_name = payload.org_name.trim().to_string();
    if org_name.is_empty() {
        return Err(ApiError::bad_request("Organization name is required"));
    }

    let username = non_blank(payload.username).unwrap_or_else(generate_username);
    let password = non_blank(payload.password)
        .unwrap_or_else(|| generate_password(DEFAULT_GENERATED_PASSWORD_LENGTH));
    let accreditation_date = parse_date(payload.accreditation_date.as_deref())?;

    let dept_name = match payload.department_id {
        Some(id) => DepartmentRepository::new((*state.db).clone())
            .find_by_id(id)
            .await?
            .map(|d| d.dept_name),
        None => None,
    };

    let org = OrganizationRepository::new((*state.db).clone())
        .create_with_master_report(NewOrganization {
            org_name: org_name.clone(),
            username: username.clone(),
            password_hash: hash_password(&password)?,
            accreditation_date,
            department_id: payload.department_id,
            created_by: Some(admin.username().to_string()),
            today: today(),
        })
        .await?;

    record_activity(
        &state,
        admin.admin_id(),
        "organization",
        &format!(
            "Added new organization: \"{org_name}\" in {}",
            dept_name.as_deref().unwrap_or("-")
        ),
    )
    .await;

    info!(org_id = org.id, admin_id = admin.admin_id(), "Organization created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Organization added",
            "username": username,
            "password": password,
        })),
    ))
}

/// PUT `/api/organizations/{org_id}` - Edit an organization and re-activate it.
async fn update_organization(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(org_id): Path<i64>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> ApiResult<Json<Value>> {
    let password_hash = match non_blank(payload.password) {
        Some(pw) => Some(hash_password(&pw)?),
        None => None,
    };

    let update = OrganizationUpdate {
        org_name: non_blank(payload.org_name),
        username: non_blank(payload.username),
        password_hash,
        accreditation_date: parse_date(payload.accreditation_date.as_deref())?,
        department_id: payload.department_id,
    };

    let Some(changes) = OrganizationRepository::new((*state.db).clone())
        .update(org_id, update)
        .await?
    else {
        return Err(ApiError::not_found("Organization not found"));
    };

    let admins = OsasAdminRepository::new((*state.db).clone());
    for change in changes {
        admins
            .log_audit(
                admin.admin_id(),
                change.field,
                change.old_value,
                change.new_value,
            )
            .await?;
    }

    record_activity(
        &state,
        admin.admin_id(),
        "organization",
        &format!("Updated organization [{org_id}]"),
    )
    .await;

    info!(org_id, admin_id = admin.admin_id(), "Organization updated");
    Ok(message("Organization updated"))
}

/// DELETE `/api/organizations/{org_id}` - Move an organization to the archive.
async fn archive_organization(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(org_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let found = OrganizationRepository::new((*state.db).clone())
        .set_status(org_id, status::ARCHIVED)
        .await?;
    if !found {
        return Err(ApiError::not_found("Organization not found"));
    }

    record_activity(
        &state,
        admin.admin_id(),
        "archive",
        &format!("Archived organization [{org_id}]"),
    )
    .await;

    info!(org_id, "Organization archived");
    Ok(message("Organization archived"))
}

/// PATCH `/api/organizations/{org_id}/restore`
async fn restore_organization(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(org_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let found = OrganizationRepository::new((*state.db).clone())
        .set_status(org_id, status::ACTIVE)
        .await?;
    if !found {
        return Err(ApiError::not_found("Organization not found"));
    }

    record_activity(
        &state,
        admin.admin_id(),
        "archive",
        &format!("Restored organization [{org_id}]"),
    )
    .await;

    info!(org_id, "Organization restored");
    Ok(message("Organization restored"))
}

/// DELETE `/api/archive/organizations/{org_id}` - Permanently delete an archived organization.
async fn delete_organization(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(org_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let deleted = OrganizationRepository::new((*state.db).clone())
        .delete_archived(org_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Archived organization not found"));
    }

    record_activity(
        &state,
        admin.admin_id(),
        "archive",
        &format!("Permanently deleted organization [{org_id}]"),
    )
    .await;

    info!(org_id, "Organization permanently deleted");
    Ok(message("Organization permanently deleted"))
}

/// DELETE /api/archive/empty - Delete every archived organization.
async fn empty_archive(
    State(state): State<AppState>,
    admin: OsasAdmin,
) -> ApiResult<Json<Value>> {
    let deleted = OrganizationRepository::new((*state.db).clone())
        .empty_archive()
        .await?;

    record_activity(
        &state,
        admin.admin_id(),
        "archive",
        &format!("Emptied archive ({deleted} organizations)"),
    )
    .await;

    info!(deleted, "Archive emptied");
    Ok(message("Archive emptied successfully"))
}

/// GET /api/departments
async fn list_departments(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let departments: Vec<Value> = DepartmentRepository::new((*state.db).clone())
        .list()
        .await?
        .into_iter()
        .map(|d| json!({ "id": d.id, "name": d.dept_name }))
        .collect();
    Ok(Json(json!({ "departments": departments })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_uses_camel_case() {
        let req: AddOrganizationRequest = serde_json::from_value(json!({
            "orgName": "Math Society",
            "accreditationDate": "2025-08-01",
            "department_id": 3
        }))
        .unwrap();
        assert_eq!(req.org_name, "Math Society");
        assert_eq!(req.accreditation_date.as_deref(), Some("2025-08-01"));
        assert_eq!(req.department_id, Some(3));
        assert!(req.username.is_none());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
