//! `SeaORM` Entity for financial_report_archive_receipts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_report_archive_receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub archive_id: i64,
    pub description: Option<String>,
    pub receipt_date: Option<Date>,
    pub file_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_report_archives::Entity",
        from = "Column::ArchiveId",
        to = "super::financial_report_archives::Column::Id"
    )]
    FinancialReportArchives,
}

impl Related<super::financial_report_archives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialReportArchives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The row as a report receipt.
    #[must_use]
    pub fn receipt_item(&self) -> orgfin_core::reports::ReceiptItem {
        orgfin_core::reports::ReceiptItem {
            description: self.description.clone(),
            receipt_date: self.receipt_date,
            file_key: self.file_url.clone(),
        }
    }
}
