//! Financial report repository.
//!
//! Handles both kinds of `financial_reports` rows: the yearly master row per
//! organization (no wallet or folder) and the per-folder snapshots.

use chrono::{NaiveDate, Utc};
use orgfin_core::checklist::{Checklist, ChecklistUpdate, ReportStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Select, Set,
};

use crate::entities::financial_reports;

/// Input for an OSAS-created master row.
#[derive(Debug, Clone, Default)]
pub struct MasterReportInput {
    /// Initial status; defaults to the status the checklist implies.
    pub status: Option<ReportStatus>,
    /// Admin notes.
    pub notes: Option<String>,
    /// Initial checklist.
    pub checklist: Checklist,
    /// Submission date; defaults to today.
    pub submission_date: Option<NaiveDate>,
}

/// Figures an organization enters when generating a report.
#[derive(Debug, Clone, Default)]
pub struct SnapshotInput {
    /// Wallet.
    pub wallet_id: i64,
    /// Month folder.
    pub budget_id: i64,
    /// Event name.
    pub event_name: Option<String>,
    /// Date prepared.
    pub date_prepared: Option<NaiveDate>,
    /// Report number.
    pub report_no: Option<String>,
    /// Budget.
    pub budget: Option<Decimal>,
    /// Total income.
    pub total_income: Option<Decimal>,
    /// Total expense.
    pub total_expense: Option<Decimal>,
    /// Reimbursement.
    pub reimbursement: Option<Decimal>,
    /// Previous fund.
    pub previous_fund: Option<Decimal>,
    /// Budget in the bank.
    pub budget_in_the_bank: Option<Decimal>,
}

/// Financial report repository.
#[derive(Debug, Clone)]
pub struct FinancialReportRepository {
    db: DatabaseConnection,
}

fn master_rows() -> Select<financial_reports::Entity> {
    financial_reports::Entity::find()
        .filter(financial_reports::Column::WalletId.is_null())
        .filter(financial_reports::Column::BudgetId.is_null())
}

fn snapshot_rows() -> Select<financial_reports::Entity> {
    financial_reports::Entity::find()
        .filter(financial_reports::Column::WalletId.is_not_null())
        .filter(financial_reports::Column::BudgetId.is_not_null())
}

impl FinancialReportRepository {
    /// Creates a new financial report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds any report row by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<financial_reports::Model>, DbErr> {
        financial_reports::Entity::find_by_id(id).one(&self.db).await
    }

    /// Master rows of an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_master(
        &self,
        organization_id: i64,
    ) -> Result<Vec<financial_reports::Model>, DbErr> {
        master_rows()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .order_by_desc(financial_reports::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Master rows of several organizations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_master_for(
        &self,
        organization_ids: Vec<i64>,
    ) -> Result<Vec<financial_reports::Model>, DbErr> {
        if organization_ids.is_empty() {
            return Ok(Vec::new());
        }
        master_rows()
            .filter(financial_reports::Column::OrganizationId.is_in(organization_ids))
            .order_by_asc(financial_reports::Column::OrganizationId)
            .all(&self.db)
            .await
    }

    /// Creates a master row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_master(
        &self,
        organization_id: i64,
        input: MasterReportInput,
        today: NaiveDate,
    ) -> Result<financial_reports::Model, DbErr> {
        let now = Utc::now().into();
        let status = input.status.unwrap_or_else(|| input.checklist.status());

        financial_reports::ActiveModel {
            organization_id: Set(organization_id),
            wallet_id: Set(None),
            budget_id: Set(None),
            status: Set(status.as_str().to_string()),
            notes: Set(Some(input.notes.unwrap_or_default())),
            checklist: Set(input.checklist.to_json()),
            submission_date: Set(Some(input.submission_date.unwrap_or(today))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Applies notes and a checklist update to a report and recomputes its
    /// status from the checklist.
    ///
    /// Returns `None` if the report does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_checklist(
        &self,
        id: i64,
        notes: Option<String>,
        update: &ChecklistUpdate,
    ) -> Result<Option<financial_reports::Model>, DbErr> {
        let Some(report) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let checklist = update.apply(Checklist::from_json(&report.checklist));
        let mut active: financial_reports::ActiveModel = report.into();
        if let Some(notes) = notes {
            active.notes = Set(Some(notes));
        }
        active.status = Set(checklist.status().as_str().to_string());
        active.checklist = Set(checklist.to_json());
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Creates or replaces the `Pending Review` snapshot of a folder.
    ///
    /// Returns the snapshot ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert_snapshot(
        &self,
        organization_id: i64,
        input: SnapshotInput,
        report_month: Option<String>,
    ) -> Result<i64, DbErr> {
        let now = Utc::now().into();
        let existing = snapshot_rows()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::WalletId.eq(input.wallet_id))
            .filter(financial_reports::Column::BudgetId.eq(input.budget_id))
            .filter(financial_reports::Column::Status.eq(ReportStatus::PendingReview.as_str()))
            .one(&self.db)
            .await?;

        let saved = match existing {
            Some(report) => {
                let mut active: financial_reports::ActiveModel = report.into();
                fill_snapshot(&mut active, input, report_month, now);
                active.update(&self.db).await?
            }
            None => {
                let mut active = financial_reports::ActiveModel {
                    organization_id: Set(organization_id),
                    wallet_id: Set(Some(input.wallet_id)),
                    budget_id: Set(Some(input.budget_id)),
                    status: Set(ReportStatus::PendingReview.as_str().to_string()),
                    created_at: Set(now),
                    ..Default::default()
                };
                fill_snapshot(&mut active, input, report_month, now);
                active.insert(&self.db).await?
            }
        };

        Ok(saved.id)
    }

    /// Latest snapshot of a folder, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_snapshot(
        &self,
        organization_id: i64,
        wallet_id: i64,
        budget_id: i64,
    ) -> Result<Option<financial_reports::Model>, DbErr> {
        snapshot_rows()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::WalletId.eq(wallet_id))
            .filter(financial_reports::Column::BudgetId.eq(budget_id))
            .order_by_desc(financial_reports::Column::CreatedAt)
            .order_by_desc(financial_reports::Column::Id)
            .one(&self.db)
            .await
    }

    /// Latest snapshot an organization made for a month key such as `august`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_snapshot_for_month(
        &self,
        organization_id: i64,
        month_key: &str,
    ) -> Result<Option<financial_reports::Model>, DbErr> {
        snapshot_rows()
            .filter(financial_reports::Column::OrganizationId.eq(organization_id))
            .filter(financial_reports::Column::ReportMonth.eq(month_key.to_lowercase()))
            .order_by_desc(financial_reports::Column::CreatedAt)
            .order_by_desc(financial_reports::Column::Id)
            .one(&self.db)
            .await
    }
}

fn fill_snapshot(
    active: &mut financial_reports::ActiveModel,
    input: SnapshotInput,
    report_month: Option<String>,
    now: sea_orm::prelude::DateTimeWithTimeZone,
) {
    active.notes = Set(None);
    active.checklist = Set(Checklist::new().to_json());
    active.event_name = Set(input.event_name);
    active.date_prepared = Set(input.date_prepared);
    active.report_no = Set(input.report_no);
    active.budget = Set(input.budget);
    active.total_income = Set(input.total_income);
    active.total_expense = Set(input.total_expense);
    active.reimbursement = Set(input.reimbursement);
    active.previous_fund = Set(input.previous_fund);
    active.budget_in_the_bank = Set(input.budget_in_the_bank);
    active.report_month = Set(report_month);
    active.updated_at = Set(now);
}
