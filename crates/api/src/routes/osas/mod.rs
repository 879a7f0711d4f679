//! OSAS administrator routes, mounted under `/osas`.

use axum::{Router, middleware};
use orgfin_db::OsasAdminRepository;
use tracing::warn;

use crate::{AppState, middleware::require_osas};

pub mod auth;
pub mod notifications;
pub mod organizations;
pub mod reports;
pub mod settings;

/// Creates the OSAS router.
#[allow(clippy::needless_pass_by_value)]
pub fn routes(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(organizations::routes())
        .merge(reports::routes())
        .merge(notifications::routes())
        .merge(settings::routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_osas));

    Router::new()
        .merge(auth::routes())
        .merge(settings::public_routes())
        .merge(protected_routes)
}

/// Writes an activity log entry; failures are logged and ignored.
pub(crate) async fn record_activity(
    state: &AppState,
    admin_id: i64,
    action_type: &str,
    description: &str,
) {
    if let Err(e) = OsasAdminRepository::new((*state.db).clone())
        .log_activity(admin_id, action_type, description)
        .await
    {
        warn!(error = %e, admin_id, action_type, "Failed to write activity log");
    }
}
