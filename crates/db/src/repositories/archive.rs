//! Submitted report archive repository.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{archive_receipts, archive_transactions, financial_report_archives};

/// An archive row with its copied transactions and receipts.
#[derive(Debug, Clone)]
pub struct ArchiveWithItems {
    /// Archive summary.
    pub archive: financial_report_archives::Model,
    /// Copied transactions by date issued.
    pub transactions: Vec<archive_transactions::Model>,
    /// Copied receipts by receipt date.
    pub receipts: Vec<archive_receipts::Model>,
}

/// Archive repository.
#[derive(Debug, Clone)]
pub struct ArchiveRepository {
    db: DatabaseConnection,
}

impl ArchiveRepository {
    /// Creates a new archive repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Archives of a folder, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_folder(
        &self,
        organization_id: i64,
        wallet_id: i64,
        budget_id: i64,
    ) -> Result<Vec<financial_report_archives::Model>, DbErr> {
        financial_report_archives::Entity::find()
            .filter(financial_report_archives::Column::OrganizationId.eq(organization_id))
            .filter(financial_report_archives::Column::WalletId.eq(wallet_id))
            .filter(financial_report_archives::Column::BudgetId.eq(budget_id))
            .order_by_asc(financial_report_archives::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Loads an archive of the organization with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned_with_items(
        &self,
        organization_id: i64,
        id: i64,
    ) -> Result<Option<ArchiveWithItems>, DbErr> {
        let Some(archive) = financial_report_archives::Entity::find_by_id(id)
            .filter(financial_report_archives::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let transactions = archive_transactions::Entity::find()
            .filter(archive_transactions::Column::ArchiveId.eq(archive.id))
            .order_by_asc(archive_transactions::Column::DateIssued)
            .order_by_asc(archive_transactions::Column::Id)
            .all(&self.db)
            .await?;

        let receipts = archive_receipts::Entity::find()
            .filter(archive_receipts::Column::ArchiveId.eq(archive.id))
            .order_by_asc(archive_receipts::Column::ReceiptDate)
            .order_by_asc(archive_receipts::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(ArchiveWithItems {
            archive,
            transactions,
            receipts,
        }))
    }
}
