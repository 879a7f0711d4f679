//! Report generation, preview, submission and the submitted archive.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::owned_folder;
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::PresOrg;
use crate::reports::{LiveReport, docx_response, render_archive};
use crate::response::{date_opt, money, money_opt};
use crate::routes::{parse_date, today};
use orgfin_core::checklist::ReportStatus;
use orgfin_core::reports::{ReportSubmissionService, next_report_number};
use orgfin_db::entities::financial_reports;
use orgfin_db::repositories::{
    ArchiveRepository, DbSubmissionStore, FinancialReportRepository, FolderContext,
    ReportContextRepository, SnapshotInput, TransactionRepository, WalletRepository,
};

/// Creates the reports router (requires the organization session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/generate", post(generate))
        .route(
            "/api/wallets/{id}/budgets/{budget_id}/reports/next-number",
            get(next_number),
        )
        .route(
            "/api/wallets/{id}/budgets/{budget_id}/reports/latest",
            get(latest),
        )
        .route(
            "/api/wallets/{id}/budgets/{budget_id}/submit",
            get(submit_status),
        )
        .route(
            "/reports/{wallet_id}/budgets/{budget_id}/preview",
            get(preview),
        )
        .route("/reports/{wallet_id}/budgets/{budget_id}/print", get(print))
        .route("/reports/{wallet_id}/submit", post(submit))
        .route("/api/wallets/{id}/archives", get(list_archives))
        .route("/api/archives/{archive_id}/download", get(download_archive))
        .route("/api/transactions", get(history))
}

/// Figures entered when generating a report.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Wallet.
    pub wallet_id: i64,
    /// Month folder.
    pub budget_id: i64,
    /// Event name.
    #[serde(default)]
    pub event_name: Option<String>,
    /// Date prepared, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_prepared: Option<String>,
    /// Report number, sent as text or as a number.
    #[serde(default)]
    pub report_no: Option<Value>,
    /// Budget.
    #[serde(default)]
    pub budget: Option<Decimal>,
    /// Total income.
    #[serde(default)]
    pub total_income: Option<Decimal>,
    /// Total expense.
    #[serde(default)]
    pub total_expense: Option<Decimal>,
    /// Reimbursement.
    #[serde(default)]
    pub reimbursement: Option<Decimal>,
    /// Previous fund.
    #[serde(default)]
    pub previous_fund: Option<Decimal>,
    /// Budget in the bank.
    #[serde(default)]
    pub budget_in_the_bank: Option<Decimal>,
}

fn report_no_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Loads a folder of the organization and checks it belongs to `wallet_id`.
async fn wallet_folder(
    state: &AppState,
    org: &PresOrg,
    wallet_id: i64,
    budget_id: i64,
) -> ApiResult<FolderContext> {
    let ctx = owned_folder(state, org.organization_id(), budget_id).await?;
    if ctx.wallet.id != wallet_id {
        return Err(ApiError::not_found("Wallet folder not found"));
    }
    Ok(ctx)
}

async fn latest_snapshot(
    state: &AppState,
    org: &PresOrg,
    wallet_id: i64,
    budget_id: i64,
) -> ApiResult<Option<financial_reports::Model>> {
    Ok(FinancialReportRepository::new((*state.db).clone())
        .latest_snapshot(org.organization_id(), wallet_id, budget_id)
        .await?)
}

/// POST /api/reports/generate - Save the folder's `Pending Review` snapshot.
async fn generate(
    State(state): State<AppState>,
    org: PresOrg,
    Json(payload): Json<GenerateRequest>,
) -> ApiResult<Json<Value>> {
    let ctx = wallet_folder(&state, &org, payload.wallet_id, payload.budget_id).await?;

    let input = SnapshotInput {
        wallet_id: payload.wallet_id,
        budget_id: payload.budget_id,
        event_name: payload.event_name,
        date_prepared: parse_date(payload.date_prepared.as_deref())?,
        report_no: report_no_text(payload.report_no),
        budget: payload.budget,
        total_income: payload.total_income,
        total_expense: payload.total_expense,
        reimbursement: payload.reimbursement,
        previous_fund: payload.previous_fund,
        budget_in_the_bank: payload.budget_in_the_bank,
    };

    let id = FinancialReportRepository::new((*state.db).clone())
        .upsert_snapshot(org.organization_id(), input, Some(ctx.month_key()))
        .await?;

    info!(report_id = id, org_id = org.organization_id(), "Report generated");
    Ok(Json(json!({ "success": true, "id": id })))
}

/// GET `/api/wallets/{wallet_id}/budgets/{budget_id}/reports/next-number`
async fn next_number(
    State(state): State<AppState>,
    org: PresOrg,
    Path((wallet_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let last = latest_snapshot(&state, &org, wallet_id, budget_id).await?;
    let next = next_report_number(last.as_ref().and_then(|r| r.report_no.as_deref()));
    Ok(Json(json!({ "next_number": next })))
}

/// GET `/api/wallets/{wallet_id}/budgets/{budget_id}/reports/latest`
async fn latest(
    State(state): State<AppState>,
    org: PresOrg,
    Path((wallet_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let Some(report) = latest_snapshot(&state, &org, wallet_id, budget_id).await? else {
        return Ok(Json(json!({ "exists": false })));
    };
    Ok(Json(json!({
        "exists": true,
        "report": {
            "id": report.id,
            "status": report.status,
            "report_no": report.report_no,
            "event_name": report.event_name,
            "date_prepared": date_opt(report.date_prepared),
            "budget": money_opt(report.budget),
            "total_expense": money_opt(report.total_expense),
            "reimbursement": money_opt(report.reimbursement),
            "previous_fund": money_opt(report.previous_fund),
            "budget_id": report.budget_id,
        }
    })))
}

/// GET `/api/wallets/{wallet_id}/budgets/{budget_id}/submit` - Whether the
/// latest snapshot was submitted.
async fn submit_status(
    State(state): State<AppState>,
    org: PresOrg,
    Path((wallet_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let submitted = latest_snapshot(&state, &org, wallet_id, budget_id)
        .await?
        .is_some_and(|r| r.status == ReportStatus::Submitted.as_str());
    Ok(Json(json!({ "submitted": submitted })))
}

async fn live_report(
    state: &AppState,
    org: &PresOrg,
    wallet_id: i64,
    budget_id: i64,
) -> ApiResult<LiveReport> {
    let Some(report) = latest_snapshot(state, org, wallet_id, budget_id).await? else {
        return Err(ApiError::not_found("No report"));
    };
    LiveReport::load(state, report).await
}

/// GET `/reports/{wallet_id}/budgets/{budget_id}/preview` - DOCX shown inline.
async fn preview(
    State(state): State<AppState>,
    org: PresOrg,
    Path((wallet_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Response> {
    let live = live_report(&state, &org, wallet_id, budget_id).await?;
    let bytes = live.render(&state).await?;
    Ok(docx_response(bytes, "financial_report_preview", false))
}

/// GET `/reports/{wallet_id}/budgets/{budget_id}/print` - Printable data.
async fn print(
    State(state): State<AppState>,
    org: PresOrg,
    Path((wallet_id, budget_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let live = live_report(&state, &org, wallet_id, budget_id).await?;
    Ok(Json(live.print_data(state.storage.as_deref()).await))
}

/// POST `/reports/{wallet_id}/submit` - Archive the pending snapshot, reset
/// the folder and notify OSAS.
async fn submit(
    State(state): State<AppState>,
    org: PresOrg,
    Path(wallet_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    WalletRepository::new((*state.db).clone())
        .find_owned_wallet(org.organization_id(), wallet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Wallet not found"))?;

    let service =
        ReportSubmissionService::new(Arc::new(DbSubmissionStore::new((*state.db).clone())));
    let outcome = service
        .submit(org.organization_id(), wallet_id, today())
        .await?;

    Ok(Json(json!({ "success": true, "archive_id": outcome.archive_id })))
}

/// GET `/api/wallets/{folder_id}/archives` - Submitted reports of a folder.
async fn list_archives(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
) -> ApiResult<Json<Vec<Value>>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    let archives = ArchiveRepository::new((*state.db).clone())
        .list_for_folder(org.organization_id(), ctx.wallet.id, folder_id)
        .await?;

    let rows = archives
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "reportid": a.report_id,
                "reportno": a.report_no,
                "eventname": a.event_name,
                "dateprepared": date_opt(a.date_prepared),
                "budget": money(a.budget),
                "totalexpense": money(a.total_expense),
                "reimbursement": money(a.reimbursement),
                "previousfund": money(a.previous_fund),
                "remaining": money(a.remaining),
                "fileurl": a.file_url,
            })
        })
        .collect();
    Ok(Json(rows))
}

/// GET `/api/archives/{archive_id}/download` - Submitted report as a DOCX
/// attachment.
async fn download_archive(
    State(state): State<AppState>,
    org: PresOrg,
    Path(archive_id): Path<i64>,
) -> ApiResult<Response> {
    let Some(archived) = ArchiveRepository::new((*state.db).clone())
        .find_owned_with_items(org.organization_id(), archive_id)
        .await?
    else {
        return Err(ApiError::not_found("Archive not found"));
    };

    let heading = ReportContextRepository::new((*state.db).clone())
        .heading(org.organization_id(), archived.archive.budget_id)
        .await?;
    let bytes = render_archive(&state, &archived, &heading).await?;

    let filename = archived
        .archive
        .report_no
        .clone()
        .unwrap_or_else(|| "financial_report".to_string());
    Ok(docx_response(bytes, &filename, true))
}

/// GET /api/transactions - Every line across the organization's wallets,
/// newest first, expenses negative.
async fn history(State(state): State<AppState>, org: PresOrg) -> ApiResult<Json<Vec<Value>>> {
    let rows = TransactionRepository::new((*state.db).clone())
        .history(org.organization_id())
        .await?;

    let rows = rows
        .iter()
        .map(|tx| {
            let amount = tx
                .line_item()
                .map_or(Decimal::ZERO, |item| item.signed_amount());
            json!({
                "id": tx.id,
                "wallet_id": tx.wallet_id,
                "type": tx.kind,
                "date": date_opt(tx.date_issued),
                "description": tx.description,
                "amount": money(amount),
            })
        })
        .collect();
    Ok(Json(rows))
}
