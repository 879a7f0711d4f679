//! Wallet transaction repository.

use chrono::{NaiveDate, Utc};
use orgfin_core::reports::LineItemKind;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{wallet_transactions, wallets};

/// Fields of an income or expense line.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    /// Income or expense.
    pub kind: LineItemKind,
    /// Date issued.
    pub date_issued: Option<NaiveDate>,
    /// Quantity.
    pub quantity: i32,
    /// Income type (incomes).
    pub income_type: Option<String>,
    /// Particulars (expenses).
    pub particulars: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
}

/// Wallet transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Transactions of a folder by date issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_folder(
        &self,
        wallet_id: i64,
        budget_id: i64,
        kind: Option<LineItemKind>,
    ) -> Result<Vec<wallet_transactions::Model>, DbErr> {
        let mut query = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet_id))
            .filter(wallet_transactions::Column::BudgetId.eq(budget_id));
        if let Some(kind) = kind {
            query = query.filter(wallet_transactions::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_asc(wallet_transactions::Column::DateIssued)
            .order_by_asc(wallet_transactions::Column::Id)
            .all(&self.db)
            .await
    }

    /// Adds a transaction to a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        wallet_id: i64,
        budget_id: i64,
        input: LineItemInput,
    ) -> Result<wallet_transactions::Model, DbErr> {
        wallet_transactions::ActiveModel {
            wallet_id: Set(wallet_id),
            budget_id: Set(budget_id),
            kind: Set(input.kind.as_str().to_string()),
            date_issued: Set(input.date_issued),
            quantity: Set(input.quantity),
            income_type: Set(input.income_type),
            particulars: Set(input.particulars),
            description: Set(input.description),
            price: Set(input.price),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Replaces the fields of a transaction in a folder.
    ///
    /// Returns `None` if the transaction is not in that folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        budget_id: i64,
        id: i64,
        input: LineItemInput,
    ) -> Result<Option<wallet_transactions::Model>, DbErr> {
        let Some(existing) = wallet_transactions::Entity::find_by_id(id)
            .filter(wallet_transactions::Column::BudgetId.eq(budget_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: wallet_transactions::ActiveModel = existing.into();
        active.kind = Set(input.kind.as_str().to_string());
        active.date_issued = Set(input.date_issued);
        active.quantity = Set(input.quantity);
        active.income_type = Set(input.income_type);
        active.particulars = Set(input.particulars);
        active.description = Set(input.description);
        active.price = Set(input.price);

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a transaction in a folder. Returns false if it is not there.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, budget_id: i64, id: i64) -> Result<bool, DbErr> {
        let result = wallet_transactions::Entity::delete_many()
            .filter(wallet_transactions::Column::Id.eq(id))
            .filter(wallet_transactions::Column::BudgetId.eq(budget_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// All transactions across the organization's wallets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        organization_id: i64,
    ) -> Result<Vec<wallet_transactions::Model>, DbErr> {
        wallet_transactions::Entity::find()
            .inner_join(wallets::Entity)
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .order_by_desc(wallet_transactions::Column::DateIssued)
            .order_by_desc(wallet_transactions::Column::Id)
            .all(&self.db)
            .await
    }
}
