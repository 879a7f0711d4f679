//! `SeaORM` Entity for financial_report_archive_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_report_archive_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub archive_id: i64,
    pub kind: String,
    pub date_issued: Option<Date>,
    pub quantity: i32,
    pub particulars: Option<String>,
    pub income_type: Option<String>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
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
    /// The row as a report line item. `None` for an unknown kind.
    #[must_use]
    pub fn line_item(&self) -> Option<orgfin_core::reports::LineItem> {
        Some(orgfin_core::reports::LineItem {
            kind: self.kind.parse().ok()?,
            date_issued: self.date_issued,
            quantity: self.quantity,
            particulars: self.particulars.clone(),
            income_type: self.income_type.clone(),
            description: self.description.clone(),
            price: self.price,
        })
    }
}
