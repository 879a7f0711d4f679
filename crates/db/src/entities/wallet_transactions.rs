//! `SeaORM` Entity for wallet_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub budget_id: i64,
    pub kind: String,
    pub date_issued: Option<Date>,
    pub quantity: i32,
    pub income_type: Option<String>,
    pub particulars: Option<String>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
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
