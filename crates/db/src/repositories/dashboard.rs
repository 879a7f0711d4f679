//! Dashboard repository.

use chrono::NaiveDate;
use orgfin_core::dashboard::DashboardSummary;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entities::{financial_reports, wallet_budgets, wallet_transactions, wallets};

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Dashboard summary of an organization as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn summary(
        &self,
        organization_id: i64,
        today: NaiveDate,
    ) -> Result<DashboardSummary, DbErr> {
        let folders = wallet_budgets::Entity::find()
            .inner_join(wallets::Entity)
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .all(&self.db)
            .await?;

        let items: Vec<_> = wallet_transactions::Entity::find()
            .inner_join(wallets::Entity)
            .filter(wallets::Column::OrganizationId.eq(organization_id))
            .all(&self.db)
            .await?
            .iter()
            .filter_map(wallet_transactions::Model::line_item)
            .collect();

        let events: Vec<Option<String>> = financial_reports::Entity::find()
            .select_only()
            .column(financial_reports::Column::EventName)
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::WalletId.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(DashboardSummary::compute(
            folders.into_iter().map(|f| f.amount),
            &items,
            events.iter().filter_map(Option::as_deref),
            today,
        ))
    }
}
