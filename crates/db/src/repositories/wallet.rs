//! Wallet and month folder repository.

use orgfin_core::reports::folder_month;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

use crate::entities::{months, wallet_budgets, wallets};

/// A month folder as listed in the wallets page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    /// Folder (`wallet_budgets`) ID.
    pub id: i64,
    /// Owning wallet.
    pub wallet_id: i64,
    /// Month name.
    pub name: String,
    /// `YYYY-MM`.
    pub month: String,
    /// Budget amount of the folder.
    #[serde(with = "rust_decimal::serde::float")]
    pub beginning_cash: Decimal,
}

/// A folder with its wallet and month.
#[derive(Debug, Clone)]
pub struct FolderContext {
    /// The folder row.
    pub folder: wallet_budgets::Model,
    /// The wallet it belongs to.
    pub wallet: wallets::Model,
    /// Its calendar month.
    pub month: months::Model,
}

impl FolderContext {
    /// Lowercase month key, as used by checklists and `report_month`.
    #[must_use]
    pub fn month_key(&self) -> String {
        self.month.month_name.to_lowercase()
    }
}

/// Wallet and folder repository.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All folders of an organization's wallets, by wallet, year and month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_folders(&self, organization_id: i64) -> Result<Vec<FolderSummary>, DbErr> {
        let wallet_ids: Vec<i64> = wallets::Entity::find()
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .order_by_asc(wallets::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|w| w.id)
            .collect();

        if wallet_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = wallet_budgets::Entity::find()
            .filter(wallet_budgets::Column::WalletId.is_in(wallet_ids))
            .find_also_related(months::Entity)
            .order_by_asc(wallet_budgets::Column::WalletId)
            .order_by_asc(wallet_budgets::Column::Year)
            .order_by_asc(months::Column::MonthOrder)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(folder, month)| {
                let month = month?;
                Some(FolderSummary {
                    id: folder.id,
                    wallet_id: folder.wallet_id,
                    month: folder_month(folder.year, u32::try_from(month.month_order).ok()?),
                    name: month.month_name,
                    beginning_cash: folder.amount,
                })
            })
            .collect())
    }

    /// Finds a wallet owned by the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned_wallet(
        &self,
        organization_id: i64,
        wallet_id: i64,
    ) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await
    }

    /// Loads a folder with its wallet and month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_folder(&self, folder_id: i64) -> Result<Option<FolderContext>, DbErr> {
        let Some((folder, Some(wallet))) = wallet_budgets::Entity::find_by_id(folder_id)
            .find_also_related(wallets::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(month) = months::Entity::find_by_id(folder.month_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(FolderContext {
            folder,
            wallet,
            month,
        }))
    }

    /// Loads a folder only if its wallet belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned_folder(
        &self,
        organization_id: i64,
        folder_id: i64,
    ) -> Result<Option<FolderContext>, DbErr> {
        Ok(self
            .find_folder(folder_id)
            .await?
            .filter(|ctx| ctx.wallet.organization_id == organization_id))
    }

    /// Sets a folder's budget amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_budget(&self, folder_id: i64, amount: Decimal) -> Result<bool, DbErr> {
        let result = wallet_budgets::Entity::update_many()
            .col_expr(
                wallet_budgets::Column::Amount,
                sea_orm::sea_query::Expr::value(amount),
            )
            .filter(wallet_budgets::Column::Id.eq(folder_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
