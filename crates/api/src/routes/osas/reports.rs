//! Master report checklists and monthly report review for OSAS.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::record_activity;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::OsasAdmin;
use crate::reports::{LiveReport, docx_response};
use crate::routes::{parse_date, today};
use orgfin_core::checklist::{Checklist, ChecklistUpdate, ReportStatus, lenient_checklist};
use orgfin_db::entities::financial_reports;
use orgfin_db::repositories::{FinancialReportRepository, MasterReportInput};

/// Creates the report review router (requires the OSAS session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/organizations/{org_id}/financial_reports",
            get(list_reports).post(create_report),
        )
        .route(
            "/api/financial_reports/{report_id}",
            get(get_report).put(update_report),
        )
        .route("/reports/{org_id}/months/{month}/print", get(print_month))
        .route(
            "/reports/{org_id}/months/{month}/download",
            get(download_month),
        )
}

/// Master report created by OSAS.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReportRequest {
    /// `Pending Review`, `In Review`, `Completed` or `Submitted`.
    #[serde(default)]
    pub status: Option<String>,
    /// Admin notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Initial checklist.
    #[serde(default, deserialize_with = "lenient_checklist")]
    pub checklist: Option<Checklist>,
    /// Submission date, `YYYY-MM-DD`.
    #[serde(default)]
    pub submission_date: Option<String>,
}

/// Notes and checklist edits.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Checklist changes.
    #[serde(flatten)]
    pub checklist: ChecklistUpdate,
}

fn repo(state: &AppState) -> FinancialReportRepository {
    FinancialReportRepository::new((*state.db).clone())
}

/// GET `/api/organizations/{org_id}/financial_reports`
async fn list_reports(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let reports = repo(&state).list_master(org_id).await?;
    Ok(Json(json!({ "reports": reports })))
}

/// POST `/api/organizations/{org_id}/financial_reports`
async fn create_report(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(org_id): Path<i64>,
    Json(payload): Json<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let status = payload
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ReportStatus>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let report = repo(&state)
        .create_master(
            org_id,
            MasterReportInput {
                status,
                notes: payload.notes,
                checklist: payload.checklist.unwrap_or_default(),
                submission_date: parse_date(payload.submission_date.as_deref())?,
            },
            today(),
        )
        .await?;

    record_activity(
        &state,
        admin.admin_id(),
        "financial_report",
        &format!("Created financial report [{}] for organization [{org_id}]", report.id),
    )
    .await;

    info!(report_id = report.id, org_id, "Master report created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Financial report created", "report": report })),
    ))
}

/// GET `/api/financial_reports/{report_id}`
async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
) -> ApiResult<Json<financial_reports::Model>> {
    repo(&state)
        .find_by_id(report_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Not found"))
}

/// PUT `/api/financial_reports/{report_id}` - Edit notes and tick months.
async fn update_report(
    State(state): State<AppState>,
    admin: OsasAdmin,
    Path(report_id): Path<i64>,
    Json(payload): Json<UpdateReportRequest>,
) -> ApiResult<Json<Value>> {
    let Some(updated) = repo(&state)
        .update_checklist(report_id, payload.notes, &payload.checklist)
        .await?
    else {
        return Err(ApiError::not_found("Report not found"));
    };

    record_activity(
        &state,
        admin.admin_id(),
        "financial_report",
        &format!("Updated financial report [{report_id}]"),
    )
    .await;

    info!(report_id, status = %updated.status, "Master report updated");
    Ok(Json(
        json!({ "message": "Financial report updated", "updated": updated }),
    ))
}

async fn month_report(state: &AppState, org_id: i64, month: &str) -> ApiResult<LiveReport> {
    let Some(report) = repo(state).latest_snapshot_for_month(org_id, month).await? else {
        return Err(ApiError::not_found("No report found"));
    };
    LiveReport::load(state, report).await
}

/// GET `/reports/{org_id}/months/{month}/print` - Printable data of an
/// organization's latest report for a month.
async fn print_month(
    State(state): State<AppState>,
    Path((org_id, month)): Path<(i64, String)>,
) -> ApiResult<Json<Value>> {
    let live = month_report(&state, org_id, &month).await?;
    Ok(Json(live.print_data(state.storage.as_deref()).await))
}

/// GET `/reports/{org_id}/months/{month}/download` - The same report as DOCX.
async fn download_month(
    State(state): State<AppState>,
    Path((org_id, month)): Path<(i64, String)>,
) -> ApiResult<Response> {
    let live = month_report(&state, org_id, &month).await?;
    let bytes = live.render(&state).await?;
    let filename = format!("financial_report_{}", month.to_lowercase());
    Ok(docx_response(bytes, &filename, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_flattens_checklist_fields() {
        let req: UpdateReportRequest = serde_json::from_value(json!({
            "notes": "Missing receipts for March",
            "receiveMonth": "march",
        }))
        .unwrap();
        assert_eq!(req.notes.as_deref(), Some("Missing receipts for March"));
        assert_eq!(req.checklist.receive_month.as_deref(), Some("march"));
        assert!(!req.checklist.complete_all);
    }

    #[test]
    fn test_create_request_accepts_checklist_object() {
        let req: CreateReportRequest = serde_json::from_value(json!({
            "status": "In Review",
            "checklist": { "august": true },
        }))
        .unwrap();
        let checklist = req.checklist.unwrap();
        assert!(checklist.is_received("august"));
        assert_eq!(checklist.status(), ReportStatus::InReview);
    }

    #[test]
    fn test_non_object_checklists_read_as_empty() {
        let req: CreateReportRequest =
            serde_json::from_value(json!({ "checklist": ["august"] })).unwrap();
        assert_eq!(req.checklist, Some(Checklist::new()));

        let req: UpdateReportRequest = serde_json::from_value(json!({
            "checklist": "august",
            "receiveMonth": "June",
        }))
        .unwrap();
        let updated = req.checklist.apply(Checklist::new());
        assert!(updated.is_received("june"));
        assert_eq!(updated.status(), ReportStatus::PendingReview);
    }
}
