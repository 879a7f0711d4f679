//! `SeaORM` Entity for wallet_budgets table.
//!
//! A row is one month folder of a wallet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub month_id: i64,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::months::Entity",
        from = "Column::MonthId",
        to = "super::months::Column::Id"
    )]
    Months,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::months::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Months.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
