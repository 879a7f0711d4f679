//! Month folders, folder budgets and income/expense lines.

use axum::{
    Json, Router,
    extract::{Path, State},
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
use crate::response::{date_opt, money, success};
use crate::routes::parse_date;
use orgfin_core::reports::LineItemKind;
use orgfin_db::entities::wallet_transactions;
use orgfin_db::repositories::{FolderSummary, LineItemInput, TransactionRepository, WalletRepository};

/// Creates the wallets router (requires the organization session middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/wallets", get(list_folders))
        .route(
            "/api/wallets/{id}/budget/current-month",
            get(get_budget),
        )
        .route("/api/wallets/{id}/budget", post(set_budget))
        .route(
            "/api/wallets/{id}/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/api/wallets/{id}/transactions/{tx_id}",
            post(update_transaction).delete(delete_transaction),
        )
}

/// Folder budget form.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetRequest {
    /// New amount; zero when absent.
    #[serde(default)]
    pub amount: Decimal,
}

/// Income or expense line form.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionRequest {
    /// `income` or `expense`.
    #[serde(default)]
    pub kind: String,
    /// Date issued, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_issued: Option<String>,
    /// Quantity.
    #[serde(default)]
    pub quantity: i32,
    /// Income type (incomes).
    #[serde(default)]
    pub income_type: Option<String>,
    /// Particulars (expenses).
    #[serde(default)]
    pub particulars: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price.
    #[serde(default)]
    pub price: Decimal,
}

impl TransactionRequest {
    fn into_input(self) -> ApiResult<LineItemInput> {
        let kind: LineItemKind = self
            .kind
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid kind"))?;
        Ok(LineItemInput {
            kind,
            date_issued: parse_date(self.date_issued.as_deref())?,
            quantity: self.quantity,
            income_type: self.income_type,
            particulars: self.particulars,
            description: self.description,
            price: self.price,
        })
    }
}

fn line_total(tx: &wallet_transactions::Model) -> Decimal {
    Decimal::from(tx.quantity) * tx.price
}

fn transaction_json(tx: &wallet_transactions::Model) -> Value {
    json!({
        "transaction": {
            "id": tx.id,
            "wallet_id": tx.wallet_id,
            "kind": tx.kind,
            "date_issued": date_opt(tx.date_issued),
            "description": tx.description,
            "quantity": tx.quantity,
            "price": money(tx.price),
            "total_amount": money(line_total(tx)),
            "income_type": tx.income_type,
            "particulars": tx.particulars,
        }
    })
}

/// GET /api/wallets - Every month folder of the organization's wallets.
async fn list_folders(
    State(state): State<AppState>,
    org: PresOrg,
) -> ApiResult<Json<Vec<FolderSummary>>> {
    let folders = WalletRepository::new((*state.db).clone())
        .list_folders(org.organization_id())
        .await?;
    Ok(Json(folders))
}

/// GET `/api/wallets/{folder_id}/budget/current-month`
async fn get_budget(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    Ok(Json(json!({ "amount": money(ctx.folder.amount) })))
}

/// POST `/api/wallets/{folder_id}/budget`
async fn set_budget(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
    Json(payload): Json<BudgetRequest>,
) -> ApiResult<Json<Value>> {
    owned_folder(&state, org.organization_id(), folder_id).await?;
    WalletRepository::new((*state.db).clone())
        .set_budget(folder_id, payload.amount)
        .await?;

    info!(folder_id, amount = %payload.amount, "Folder budget set");
    Ok(success())
}

/// GET `/api/wallets/{folder_id}/transactions` - Lines by date issued.
async fn list_transactions(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
) -> ApiResult<Json<Vec<Value>>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    let rows = TransactionRepository::new((*state.db).clone())
        .list_for_folder(ctx.wallet.id, folder_id, None)
        .await?;

    let rows = rows
        .iter()
        .map(|tx| {
            json!({
                "id": tx.id,
                "quantity": tx.quantity,
                "price": money(tx.price),
                "incometype": tx.income_type,
                "particulars": tx.particulars,
                "description": tx.description,
                "total_amount": money(line_total(tx)),
                "date_issued": date_opt(tx.date_issued),
                "kind": tx.kind,
            })
        })
        .collect();
    Ok(Json(rows))
}

/// POST `/api/wallets/{folder_id}/transactions`
async fn create_transaction(
    State(state): State<AppState>,
    org: PresOrg,
    Path(folder_id): Path<i64>,
    Json(payload): Json<TransactionRequest>,
) -> ApiResult<Json<Value>> {
    let ctx = owned_folder(&state, org.organization_id(), folder_id).await?;
    let input = payload.into_input()?;

    let tx = TransactionRepository::new((*state.db).clone())
        .create(ctx.wallet.id, folder_id, input)
        .await?;

    info!(tx_id = tx.id, folder_id, kind = %tx.kind, "Transaction added");
    Ok(Json(transaction_json(&tx)))
}

/// POST `/api/wallets/{folder_id}/transactions/{tx_id}` - Replace a line.
async fn update_transaction(
    State(state): State<AppState>,
    org: PresOrg,
    Path((folder_id, tx_id)): Path<(i64, i64)>,
    Json(payload): Json<TransactionRequest>,
) -> ApiResult<Json<Value>> {
    owned_folder(&state, org.organization_id(), folder_id).await?;
    let input = payload.into_input()?;

    let Some(tx) = TransactionRepository::new((*state.db).clone())
        .update(folder_id, tx_id, input)
        .await?
    else {
        return Err(ApiError::not_found("Transaction not found"));
    };

    info!(tx_id, folder_id, "Transaction updated");
    Ok(Json(transaction_json(&tx)))
}

/// DELETE `/api/wallets/{folder_id}/transactions/{tx_id}`
async fn delete_transaction(
    State(state): State<AppState>,
    org: PresOrg,
    Path((folder_id, tx_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    owned_folder(&state, org.organization_id(), folder_id).await?;
    let deleted = TransactionRepository::new((*state.db).clone())
        .delete(folder_id, tx_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Transaction not found"));
    }

    info!(tx_id, folder_id, "Transaction deleted");
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(kind: &str) -> TransactionRequest {
        serde_json::from_value(json!({
            "kind": kind,
            "date_issued": "2025-08-14",
            "quantity": 3,
            "particulars": "Bond paper",
            "price": 45.5,
        }))
        .unwrap()
    }

    #[rstest]
    #[case("income", LineItemKind::Income)]
    #[case("expense", LineItemKind::Expense)]
    #[case("Expense", LineItemKind::Expense)]
    fn test_valid_kinds(#[case] kind: &str, #[case] expected: LineItemKind) {
        let input = request(kind).into_input().unwrap();
        assert_eq!(input.kind, expected);
        assert_eq!(input.quantity, 3);
        assert_eq!(input.price, Decimal::new(455, 1));
    }

    #[rstest]
    #[case("")]
    #[case("transfer")]
    fn test_invalid_kind_is_rejected(#[case] kind: &str) {
        let err = request(kind).into_input().unwrap_err();
        assert_eq!(err.0.public_message(), "Invalid kind");
    }

    #[test]
    fn test_budget_defaults_to_zero() {
        let req: BudgetRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.amount, Decimal::ZERO);
    }
}
