//! `SeaORM` Entity for organizations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub org_name: String,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub accreditation_date: Option<Date>,
    pub status: String,
    pub department_id: Option<i64>,
    pub must_change_password: bool,
    pub created_by: Option<String>,
    pub org_short_name: Option<String>,
    pub department: Option<String>,
    pub school: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Departments,
    #[sea_orm(has_many = "super::wallets::Entity")]
    Wallets,
    #[sea_orm(has_many = "super::financial_reports::Entity")]
    FinancialReports,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::financial_reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Organization status values.
pub mod status {
    /// Visible to OSAS and allowed to sign in.
    pub const ACTIVE: &str = "Active";
    /// Soft-deleted; sign-in is refused.
    pub const ARCHIVED: &str = "Archived";
}
