//! `SeaORM` Entity for financial_report_archives table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_report_archives")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organization_id: i64,
    pub wallet_id: i64,
    pub budget_id: Option<i64>,
    pub report_id: Option<i64>,
    pub report_no: Option<String>,
    pub event_name: Option<String>,
    pub date_prepared: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub reimbursement: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_fund: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    pub file_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::archive_transactions::Entity")]
    ArchiveTransactions,
    #[sea_orm(has_many = "super::archive_receipts::Entity")]
    ArchiveReceipts,
}

impl Related<super::archive_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArchiveTransactions.def()
    }
}

impl Related<super::archive_receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArchiveReceipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
