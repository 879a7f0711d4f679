//! `SeaORM` Entity for osas_sessions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "osas_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub admin_id: i64,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub last_active_at: DateTimeWithTimeZone,
    pub is_current: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::osas_admins::Entity",
        from = "Column::AdminId",
        to = "super::osas_admins::Column::Id"
    )]
    OsasAdmins,
}

impl Related<super::osas_admins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OsasAdmins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
