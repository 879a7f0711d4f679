//! `SeaORM` Entity for financial_reports table.
//!
//! Rows without `wallet_id`/`budget_id` are an organization's yearly master
//! report holding the OSAS checklist. Rows with them are per-wallet monthly
//! snapshots entered by the organization.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organization_id: i64,
    pub wallet_id: Option<i64>,
    pub budget_id: Option<i64>,
    pub status: String,
    pub notes: Option<String>,
    pub checklist: Json,
    pub submission_date: Option<Date>,
    pub event_name: Option<String>,
    pub date_prepared: Option<Date>,
    pub report_no: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub budget: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_income: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_expense: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub reimbursement: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub previous_fund: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub budget_in_the_bank: Option<Decimal>,
    pub report_month: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Money figures of a snapshot row.
    #[must_use]
    pub fn figures(&self) -> orgfin_core::reports::ReportFigures {
        orgfin_core::reports::ReportFigures::from_optional(
            self.budget,
            self.total_income,
            self.total_expense,
            self.reimbursement,
            self.previous_fund,
            self.budget_in_the_bank,
        )
    }
}
