//! Organization dashboard summary.

use axum::{Json, Router, extract::State, routing::get};
use orgfin_core::dashboard::DashboardSummary;
use orgfin_db::repositories::DashboardRepository;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::PresOrg;
use crate::routes::today;

/// Creates the dashboard router (requires the organization session middleware).
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/summary", get(summary))
}

/// GET /api/dashboard/summary - Balance, events and this month's totals.
async fn summary(
    State(state): State<AppState>,
    org: PresOrg,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = DashboardRepository::new((*state.db).clone())
        .summary(org.organization_id(), today())
        .await?;
    Ok(Json(summary))
}
