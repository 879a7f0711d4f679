//! Wallet receipt repository.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{wallet_receipts, wallets};

/// Wallet receipt repository.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    db: DatabaseConnection,
}

impl ReceiptRepository {
    /// Creates a new receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Receipts of a folder, newest receipt date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_newest_first(
        &self,
        wallet_id: i64,
        budget_id: i64,
    ) -> Result<Vec<wallet_receipts::Model>, DbErr> {
        wallet_receipts::Entity::find()
            .filter(wallet_receipts::Column::WalletId.eq(wallet_id))
            .filter(wallet_receipts::Column::BudgetId.eq(budget_id))
            .order_by_desc(wallet_receipts::Column::ReceiptDate)
            .order_by_desc(wallet_receipts::Column::Id)
            .all(&self.db)
            .await
    }

    /// Receipts of a folder in report order (oldest receipt date first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_report(
        &self,
        wallet_id: i64,
        budget_id: i64,
    ) -> Result<Vec<wallet_receipts::Model>, DbErr> {
        wallet_receipts::Entity::find()
            .filter(wallet_receipts::Column::WalletId.eq(wallet_id))
            .filter(wallet_receipts::Column::BudgetId.eq(budget_id))
            .order_by_asc(wallet_receipts::Column::ReceiptDate)
            .order_by_asc(wallet_receipts::Column::Id)
            .all(&self.db)
            .await
    }

    /// Records an uploaded receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        wallet_id: i64,
        budget_id: i64,
        file_key: &str,
        description: &str,
        receipt_date: NaiveDate,
    ) -> Result<wallet_receipts::Model, DbErr> {
        wallet_receipts::ActiveModel {
            wallet_id: Set(wallet_id),
            budget_id: Set(budget_id),
            file_url: Set(file_key.to_string()),
            description: Set(Some(description.to_string())),
            receipt_date: Set(Some(receipt_date)),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Finds a receipt in one of the organization's wallets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned(
        &self,
        organization_id: i64,
        id: i64,
    ) -> Result<Option<wallet_receipts::Model>, DbErr> {
        wallet_receipts::Entity::find_by_id(id)
            .inner_join(wallets::Entity)
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await
    }

    /// Deletes a receipt row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: i64) -> Result<bool, DbErr> {
        let result = wallet_receipts::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
