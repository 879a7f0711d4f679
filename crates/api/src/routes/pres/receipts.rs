//! Receipt photos of a month folder.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get},
};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{owned_folder, storage};
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::PresOrg;
use crate::response::{date_opt, success};
use crate::routes::parse_date;
use orgfin_core::storage::StorageService;
use orgfin_db::OrganizationRepository;
use orgfin_db::entities::wallet_receipts;
use orgfin_db::repositories::ReceiptRepository;

/// Creates the receipts router (requires the organization session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/wallets/{id}/receipts",
            get(list_receipts).post(upload_receipt),
        )
        .route("/api/receipts/{receipt_id}/url", get(receipt_url))
        .route(
            "/api/receipts/{receipt_id}/download-url",
            get(receipt_download_url),
        )
        .route("/api/receipts/{receipt_id}", delete(delete_receipt))
}

/// Fields of the receipt upload form.
#[derive(Debug, Default)]
struct ReceiptUpload {
    file: Option<(String, String, Vec<u8>)>,
    description: Option<String>,
    date: Option<String>,
}

impl ReceiptUpload {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut upload = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            match field.name() {
                Some("receipt-file") => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    upload.file = Some((filename, content_type, bytes.to_vec()));
                }
                Some("receipt-desc") => {
                    upload.description = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| ApiError::bad_request(e.body_text()))?,
                    );
                }
                Some("receipt-date") => {
                    upload.date = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| ApiError::bad_request(e.body_text()))?,
                    );
                }
                _ => {}
            }
        }
        Ok(upload)
    }
}

async fn owned_receipt(
    state: &AppState,
    org: &PresOrg,
    receipt_id: i64,
) -> ApiResult<wallet_receipts::Model> {
    ReceiptRepository::new((*state.db).clone())
        .find_owned(org.organization_id(), receipt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))
}

/// GET `/api/wallets/{folder_id}/receipts` - Newest receipt first.
async fn list_receipts(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
) -> ApiResult<Json<Vec<Value>>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    let receipts = ReceiptRepository::new((*state.db).clone())
        .list_newest_first(ctx.wallet.id, folder_id)
        .await?;

    let rows = receipts
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "description": r.description,
                "receipt_date": date_opt(r.receipt_date),
                "file_url": r.file_url,
            })
        })
        .collect();
    Ok(Json(rows))
}

/// POST `/api/wallets/{folder_id}/receipts` - Upload a receipt photo.
///
/// The object is stored under `{org}/{wallet}/{month}/{uuid}{ext}`.
async fn upload_receipt(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    let upload = ReceiptUpload::read(multipart).await?;

    let Some((filename, content_type, bytes)) = upload.file else {
        return Err(ApiError::bad_request("No file provided"));
    };
    let description = upload
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing fields"))?;
    let Some(receipt_date) = parse_date(upload.date.as_deref())? else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    let storage = storage(&state)?;
    storage.validate_upload(&content_type, u64::try_from(bytes.len()).unwrap_or(u64::MAX))?;

    let org_name = OrganizationRepository::new((*state.db).clone())
        .find_by_id(org.organization_id())
        .await?
        .map_or_else(
            || format!("org-{}", org.organization_id()),
            |o| o.org_name,
        );
    let key = StorageService::receipt_key(
        &org_name,
        &ctx.wallet.name,
        &ctx.month.month_name,
        &filename,
    );

    storage.upload(&key, bytes, &content_type).await?;

    let receipt = ReceiptRepository::new((*state.db).clone())
        .create(ctx.wallet.id, folder_id, &key, &description, receipt_date)
        .await?;

    info!(receipt_id = receipt.id, folder_id, key = %key, "Receipt uploaded");
    Ok(Json(json!({
        "id": receipt.id,
        "name": receipt.description,
        "date": date_opt(receipt.receipt_date),
    })))
}

/// GET `/api/receipts/{receipt_id}/url` - Viewing link.
async fn receipt_url(
    State(state): State<AppState>,
    org: PresOrg,
    Path(receipt_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let receipt = owned_receipt(&state, &org, receipt_id).await?;
    let url = storage(&state)?.object_url(&receipt.file_url, false).await?;
    Ok(Json(json!({ "url": url })))
}

/// GET `/api/receipts/{receipt_id}/download-url` - Download link.
async fn receipt_download_url(
    State(state): State<AppState>,
    org: PresOrg,
    Path(receipt_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let receipt = owned_receipt(&state, &org, receipt_id).await?;
    let url = storage(&state)?.object_url(&receipt.file_url, true).await?;
    Ok(Json(json!({ "url": url })))
}

/// DELETE `/api/receipts/{receipt_id}` - Remove the object, then the row.
async fn delete_receipt(
    State(state): State<AppState>,
    org: PresOrg,
    Path(receipt_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let receipt = owned_receipt(&state, &org, receipt_id).await?;

    match storage(&state) {
        Ok(storage) => storage.delete(&receipt.file_url).await?,
        Err(_) => warn!(receipt_id, "No storage configured; deleting receipt row only"),
    }

    ReceiptRepository::new((*state.db).clone())
        .delete(receipt.id)
        .await?;

    info!(receipt_id, "Receipt deleted");
    Ok(success())
}
