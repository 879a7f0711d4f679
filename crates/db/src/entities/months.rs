//! `SeaORM` Entity for months table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "months")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub month_name: String,
    pub month_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallet_budgets::Entity")]
    WalletBudgets,
}

impl Related<super::wallet_budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletBudgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
