//! Database implementation of the report submission store.

use chrono::Utc;
use orgfin_core::checklist::{Checklist, ReportStatus};
use orgfin_core::reports::{ArchiveRequest, PendingSnapshot, SubmissionError, SubmissionStore};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::notification::NotificationRepository;
use crate::entities::{
    archive_receipts, archive_transactions, financial_report_archives, financial_reports, months,
    organizations, wallet_budgets, wallet_receipts, wallet_transactions,
};

fn store_err(err: DbErr) -> SubmissionError {
    SubmissionError::Store(err.to_string())
}

/// Submission store backed by Postgres.
#[derive(Debug, Clone)]
pub struct DbSubmissionStore {
    db: DatabaseConnection,
}

impl DbSubmissionStore {
    /// Creates a new submission store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn write_archive(
        txn: &DatabaseTransaction,
        request: &ArchiveRequest,
    ) -> Result<i64, DbErr> {
        let snapshot = &request.snapshot;
        let now = Utc::now().into();

        let report = financial_reports::Entity::find_by_id(snapshot.report_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("report {}", snapshot.report_id)))?;
        let mut report: financial_reports::ActiveModel = report.into();
        report.status = Set(ReportStatus::Submitted.as_str().to_string());
        report.submission_date = Set(Some(request.submitted_on));
        report.updated_at = Set(now);
        report.update(txn).await?;

        let figures = &snapshot.figures;
        let archive = financial_report_archives::ActiveModel {
            organization_id: Set(snapshot.organization_id),
            wallet_id: Set(snapshot.wallet_id),
            budget_id: Set(snapshot.budget_id),
            report_id: Set(Some(snapshot.report_id)),
            report_no: Set(snapshot.report_no.clone()),
            event_name: Set(snapshot.event_name.clone()),
            date_prepared: Set(snapshot.date_prepared),
            budget: Set(figures.budget),
            total_expense: Set(figures.total_expense),
            reimbursement: Set(figures.reimbursement),
            previous_fund: Set(figures.previous_fund),
            remaining: Set(request.remaining),
            file_url: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let Some(budget_id) = snapshot.budget_id else {
            return Ok(archive.id);
        };

        let transactions = wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(snapshot.wallet_id))
            .filter(wallet_transactions::Column::BudgetId.eq(budget_id))
            .order_by_asc(wallet_transactions::Column::DateIssued)
            .order_by_asc(wallet_transactions::Column::Id)
            .all(txn)
            .await?;
        if !transactions.is_empty() {
            archive_transactions::Entity::insert_many(transactions.into_iter().map(|tx| {
                archive_transactions::ActiveModel {
                    archive_id: Set(archive.id),
                    kind: Set(tx.kind),
                    date_issued: Set(tx.date_issued),
                    quantity: Set(tx.quantity),
                    particulars: Set(tx.particulars),
                    income_type: Set(tx.income_type),
                    description: Set(tx.description),
                    price: Set(tx.price),
                    ..Default::default()
                }
            }))
            .exec(txn)
            .await?;
        }

        let receipts = wallet_receipts::Entity::find()
            .filter(wallet_receipts::Column::WalletId.eq(snapshot.wallet_id))
            .filter(wallet_receipts::Column::BudgetId.eq(budget_id))
            .order_by_asc(wallet_receipts::Column::ReceiptDate)
            .order_by_asc(wallet_receipts::Column::Id)
            .all(txn)
            .await?;
        if !receipts.is_empty() {
            archive_receipts::Entity::insert_many(receipts.into_iter().map(|r| {
                archive_receipts::ActiveModel {
                    archive_id: Set(archive.id),
                    description: Set(r.description),
                    receipt_date: Set(r.receipt_date),
                    file_url: Set(r.file_url),
                    ..Default::default()
                }
            }))
            .exec(txn)
            .await?;
        }

        wallet_transactions::Entity::delete_many()
            .filter(wallet_transactions::Column::WalletId.eq(snapshot.wallet_id))
            .filter(wallet_transactions::Column::BudgetId.eq(budget_id))
            .exec(txn)
            .await?;
        wallet_receipts::Entity::delete_many()
            .filter(wallet_receipts::Column::WalletId.eq(snapshot.wallet_id))
            .filter(wallet_receipts::Column::BudgetId.eq(budget_id))
            .exec(txn)
            .await?;

        wallet_budgets::Entity::update_many()
            .col_expr(
                wallet_budgets::Column::Amount,
                sea_orm::sea_query::Expr::value(Decimal::ZERO),
            )
            .filter(wallet_budgets::Column::Id.eq(budget_id))
            .exec(txn)
            .await?;

        Self::tick_master_checklist(txn, snapshot.organization_id, budget_id).await?;

        Ok(archive.id)
    }

    /// Marks the folder's month received on the organization's master row.
    async fn tick_master_checklist(
        txn: &DatabaseTransaction,
        organization_id: i64,
        budget_id: i64,
    ) -> Result<(), DbErr> {
        let Some((_, Some(month))) = wallet_budgets::Entity::find_by_id(budget_id)
            .find_also_related(months::Entity)
            .one(txn)
            .await?
        else {
            return Ok(());
        };

        let Some(master) = financial_reports::Entity::find()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::WalletId.is_null())
            .filter(financial_reports::Column::BudgetId.is_null())
            .order_by_asc(financial_reports::Column::CreatedAt)
            .one(txn)
            .await?
        else {
            tracing::debug!(organization_id, "No master report to tick");
            return Ok(());
        };

        let mut checklist = Checklist::from_json(&master.checklist);
        checklist.mark_received(&month.month_name);

        let mut active: financial_reports::ActiveModel = master.into();
        active.status = Set(checklist.status().as_str().to_string());
        active.checklist = Set(checklist.to_json());
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;
        Ok(())
    }
}

impl SubmissionStore for DbSubmissionStore {
    async fn latest_pending(
        &self,
        organization_id: i64,
        wallet_id: i64,
    ) -> Result<Option<PendingSnapshot>, SubmissionError> {
        let report = financial_reports::Entity::find()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::WalletId.eq(wallet_id))
            .filter(financial_reports::Column::Status.eq(ReportStatus::PendingReview.as_str()))
            .order_by_desc(financial_reports::Column::CreatedAt)
            .order_by_desc(financial_reports::Column::Id)
            .one(&self.db)
            .await
            .map_err(store_err)?;

        let Some(report) = report else {
            return Ok(None);
        };

        let organization_name = organizations::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map_or_else(|| "Organization".to_string(), |o| o.org_name);

        Ok(Some(PendingSnapshot {
            report_id: report.id,
            organization_id,
            organization_name,
            wallet_id,
            budget_id: report.budget_id,
            figures: report.figures(),
            report_no: report.report_no,
            event_name: report.event_name,
            date_prepared: report.date_prepared,
        }))
    }

    async fn archive_and_reset(&self, request: &ArchiveRequest) -> Result<i64, SubmissionError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let archive_id = Self::write_archive(&txn, request)
            .await
            .map_err(store_err)?;
        txn.commit().await.map_err(store_err)?;
        Ok(archive_id)
    }

    async fn notify_osas(
        &self,
        snapshot: &PendingSnapshot,
        message: &str,
    ) -> Result<(), SubmissionError> {
        NotificationRepository::create(
            &self.db,
            snapshot.organization_id,
            snapshot.report_id,
            &snapshot.organization_name,
            message,
        )
        .await
        .map_err(store_err)?;
        Ok(())
    }
}
