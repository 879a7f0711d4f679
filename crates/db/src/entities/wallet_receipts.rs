//! `SeaORM` Entity for wallet_receipts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub budget_id: i64,
    /// Object key in the receipts bucket.
    pub file_url: String,
    pub description: Option<String>,
    pub receipt_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
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
