//! Student organization routes, mounted under `/pres`.

use axum::{Router, extract::DefaultBodyLimit, middleware};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, middleware::require_pres};
use orgfin_core::storage::{StorageConfig, StorageService};
use orgfin_db::repositories::{FolderContext, WalletRepository};

use super::health;

pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod receipts;
pub mod reports;
pub mod wallets;

/// Room for multipart boundaries and text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the organization router.
#[allow(clippy::needless_pass_by_value)]
pub fn routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(upload_body_limit(&state));
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(dashboard::routes())
        .merge(wallets::routes())
        .merge(receipts::routes().layer(upload_limit))
        .merge(reports::routes())
        .merge(profile::routes().layer(upload_limit))
        .layer(middleware::from_fn_with_state(state.clone(), require_pres));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Request body limit for upload routes, sized from the storage file limit.
fn upload_body_limit(state: &AppState) -> usize {
    let max_file = state
        .storage
        .as_deref()
        .map_or(StorageConfig::DEFAULT_MAX_FILE_SIZE, |s| s.config().max_file_size);
    usize::try_from(max_file)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

/// Loads a month folder of the organization, 404 otherwise.
pub(crate) async fn owned_folder(
    state: &AppState,
    organization_id: i64,
    folder_id: i64,
) -> ApiResult<FolderContext> {
    WalletRepository::new((*state.db).clone())
        .find_owned_folder(organization_id, folder_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Wallet folder not found"))
}

/// The configured object storage, 503 otherwise.
pub(crate) fn storage(state: &AppState) -> ApiResult<&StorageService> {
    state
        .storage
        .as_deref()
        .ok_or_else(|| ApiError::unavailable("File storage is not configured"))
}
