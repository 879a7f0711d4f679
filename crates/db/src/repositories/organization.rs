//! Organization repository for database operations.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use orgfin_core::checklist::{Checklist, ReportStatus};
use orgfin_core::reports::academic_year_folders;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{
    departments, financial_reports, months, organizations, organizations::status, profile_users,
    wallet_budgets, wallets,
};

/// Department filter value meaning "no filter".
pub const ALL_DEPARTMENTS: &str = "All Departments";

/// School written on the default profile row of a new organization.
pub const DEFAULT_SCHOOL_NAME: &str =
    "Laguna State Polytechnic University, Sta. Cruz, Laguna (LSPU-SCC)";

/// Name of the wallet every new organization starts with.
pub const DEFAULT_WALLET_NAME: &str = "General Fund";

/// Error types for organization operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    /// Another organization already uses the name or username.
    #[error("Organization name or username already exists")]
    Duplicate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    /// Display name.
    pub org_name: String,
    /// Sign-in username.
    pub username: String,
    /// Argon2 hash of the initial password.
    pub password_hash: String,
    /// Accreditation date.
    pub accreditation_date: Option<NaiveDate>,
    /// Department (college) of the organization.
    pub department_id: Option<i64>,
    /// Username of the OSAS admin creating it.
    pub created_by: Option<String>,
    /// Fallback for the accreditation date.
    pub today: NaiveDate,
}

/// Partial update applied by OSAS.
#[derive(Debug, Clone, Default)]
pub struct OrganizationUpdate {
    /// New display name.
    pub org_name: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// Hash of a new password.
    pub password_hash: Option<String>,
    /// New accreditation date.
    pub accreditation_date: Option<NaiveDate>,
    /// New department.
    pub department_id: Option<i64>,
}

/// Profile fields an organization edits for itself.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Display name.
    pub org_name: Option<String>,
    /// Short name or acronym.
    pub org_short_name: Option<String>,
    /// Department text shown on the profile.
    pub department: Option<String>,
    /// School text shown on the profile.
    pub school: Option<String>,
}

impl ProfileUpdate {
    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.org_name.is_none()
            && self.org_short_name.is_none()
            && self.department.is_none()
            && self.school.is_none()
    }
}

/// One changed column, as written to the admin audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Column name.
    pub field: &'static str,
    /// Previous value.
    pub old_value: Option<String>,
    /// New value.
    pub new_value: Option<String>,
}

/// An organization with its department name.
#[derive(Debug, Clone)]
pub struct OrganizationListing {
    /// The organization row.
    pub organization: organizations::Model,
    /// Name of the linked department.
    pub department_name: Option<String>,
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an organization by sign-in username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Checks if a name or username is used by an organization other than `except`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn name_or_username_taken(
        &self,
        org_name: Option<&str>,
        username: Option<&str>,
        except: Option<i64>,
    ) -> Result<bool, DbErr> {
        let mut any = Condition::any();
        if let Some(name) = org_name {
            any = any.add(organizations::Column::OrgName.eq(name));
        }
        if let Some(username) = username {
            any = any.add(organizations::Column::Username.eq(username));
        }
        if any.is_empty() {
            return Ok(false);
        }

        let mut query = organizations::Entity::find().filter(any);
        if let Some(id) = except {
            query = query.filter(organizations::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// Lists organizations with the given status, optionally limited to one
    /// department by name. [`ALL_DEPARTMENTS`] disables the filter and an
    /// unknown department name matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_status(
        &self,
        org_status: &str,
        department: Option<&str>,
    ) -> Result<Vec<OrganizationListing>, DbErr> {
        let mut query = organizations::Entity::find()
            .filter(organizations::Column::Status.eq(org_status));

        if let Some(name) = department.filter(|d| !d.is_empty() && *d != ALL_DEPARTMENTS) {
            let Some(dept) = departments::Entity::find()
                .filter(departments::Column::DeptName.eq(name))
                .one(&self.db)
                .await?
            else {
                return Ok(Vec::new());
            };
            query = query.filter(organizations::Column::DepartmentId.eq(dept.id));
        }

        let rows = query
            .order_by_asc(organizations::Column::OrgName)
            .find_also_related(departments::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(organization, dept)| OrganizationListing {
                organization,
                department_name: dept.map(|d| d.dept_name),
            })
            .collect())
    }

    /// Creates an organization together with its master report, default
    /// profile row and a default wallet holding one folder per month of the
    /// academic year.
    ///
    /// # Errors
    ///
    /// Returns `OrganizationError::Duplicate` if the name or username is taken.
    pub async fn create_with_master_report(
        &self,
        input: NewOrganization,
    ) -> Result<organizations::Model, OrganizationError> {
        if self
            .name_or_username_taken(Some(&input.org_name), Some(&input.username), None)
            .await?
        {
            return Err(OrganizationError::Duplicate);
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let opened_on = input.accreditation_date.unwrap_or(input.today);

        let org = organizations::ActiveModel {
            org_name: Set(input.org_name),
            username: Set(input.username),
            password: Set(input.password_hash),
            accreditation_date: Set(input.accreditation_date),
            status: Set(status::ACTIVE.to_string()),
            department_id: Set(input.department_id),
            must_change_password: Set(true),
            created_by: Set(input.created_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        financial_reports::ActiveModel {
            organization_id: Set(org.id),
            status: Set(ReportStatus::PendingReview.as_str().to_string()),
            notes: Set(Some(String::new())),
            checklist: Set(Checklist::new().to_json()),
            submission_date: Set(Some(opened_on)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        profile_users::ActiveModel {
            organization_id: Set(org.id),
            school_name: Set(Some(DEFAULT_SCHOOL_NAME.to_string())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let wallet = wallets::ActiveModel {
            organization_id: Set(org.id),
            name: Set(DEFAULT_WALLET_NAME.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let month_ids: HashMap<i32, i64> = months::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| (m.month_order, m.id))
            .collect();

        let folders: Vec<wallet_budgets::ActiveModel> = academic_year_folders(opened_on)
            .into_iter()
            .filter_map(|(order, year)| {
                let month_id = *month_ids.get(&i32::try_from(order).ok()?)?;
                Some(wallet_budgets::ActiveModel {
                    wallet_id: Set(wallet.id),
                    month_id: Set(month_id),
                    year: Set(year),
                    amount: Set(Decimal::ZERO),
                    ..Default::default()
                })
            })
            .collect();

        if !folders.is_empty() {
            wallet_budgets::Entity::insert_many(folders).exec(&txn).await?;
        }

        txn.commit().await?;

        Ok(org)
    }

    /// Applies an OSAS edit and re-activates the organization.
    ///
    /// Returns the changed fields, or `None` if the organization does not exist.
    /// Password changes are reported as `[UPDATED]`.
    ///
    /// # Errors
    ///
    /// Returns `OrganizationError::Duplicate` if the new name or username is taken.
    pub async fn update(
        &self,
        id: i64,
        input: OrganizationUpdate,
    ) -> Result<Option<Vec<FieldChange>>, OrganizationError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let new_name = input.org_name.as_deref().filter(|n| *n != existing.org_name);
        let new_username = input
            .username
            .as_deref()
            .filter(|u| *u != existing.username);
        if self
            .name_or_username_taken(new_name, new_username, Some(id))
            .await?
        {
            return Err(OrganizationError::Duplicate);
        }

        let mut changes = Vec::new();
        let mut active: organizations::ActiveModel = existing.clone().into();

        if let Some(name) = input.org_name.filter(|n| *n != existing.org_name) {
            changes.push(change("org_name", Some(&existing.org_name), Some(&name)));
            active.org_name = Set(name);
        }
        if let Some(username) = input.username.filter(|u| *u != existing.username) {
            changes.push(change("username", Some(&existing.username), Some(&username)));
            active.username = Set(username);
        }
        if let Some(hash) = input.password_hash {
            changes.push(change("password", None, Some("[UPDATED]")));
            active.password = Set(hash);
        }
        if let Some(date) = input
            .accreditation_date
            .filter(|d| existing.accreditation_date != Some(*d))
        {
            changes.push(FieldChange {
                field: "accreditation_date",
                old_value: existing.accreditation_date.map(|d| d.to_string()),
                new_value: Some(date.to_string()),
            });
            active.accreditation_date = Set(Some(date));
        }
        if let Some(dept) = input
            .department_id
            .filter(|d| existing.department_id != Some(*d))
        {
            changes.push(FieldChange {
                field: "department_id",
                old_value: existing.department_id.map(|d| d.to_string()),
                new_value: Some(dept.to_string()),
            });
            active.department_id = Set(Some(dept));
        }
        if existing.status != status::ACTIVE {
            changes.push(change("status", Some(&existing.status), Some(status::ACTIVE)));
            active.status = Set(status::ACTIVE.to_string());
        }

        if !changes.is_empty() {
            active.update(&self.db).await?;
        }

        Ok(Some(changes))
    }

    /// Sets the status of an organization.
    ///
    /// Returns false if the organization does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_status(&self, id: i64, org_status: &str) -> Result<bool, DbErr> {
        let result = organizations::Entity::update_many()
            .col_expr(
                organizations::Column::Status,
                sea_orm::sea_query::Expr::value(org_status),
            )
            .filter(organizations::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Permanently deletes an archived organization and everything it owns.
    ///
    /// Returns false if no archived organization has this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_archived(&self, id: i64) -> Result<bool, DbErr> {
        let result = organizations::Entity::delete_many()
            .filter(organizations::Column::Id.eq(id))
            .filter(organizations::Column::Status.eq(status::ARCHIVED))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Permanently deletes every archived organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn empty_archive(&self) -> Result<u64, DbErr> {
        let result = organizations::Entity::delete_many()
            .filter(organizations::Column::Status.eq(status::ARCHIVED))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Stores a new password chosen by the organization and clears the
    /// must-change flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn change_password(&self, id: i64, password_hash: &str) -> Result<bool, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let mut active: organizations::ActiveModel = org.into();
        active.password = Set(password_hash.to_string());
        active.must_change_password = Set(false);
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Updates the organization's own profile fields.
    ///
    /// Returns the updated row, or `None` if the organization does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_profile(
        &self,
        id: i64,
        input: ProfileUpdate,
    ) -> Result<Option<organizations::Model>, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut active: organizations::ActiveModel = org.into();

        if let Some(name) = input.org_name {
            active.org_name = Set(name);
        }
        if let Some(short) = input.org_short_name {
            active.org_short_name = Set(Some(short));
        }
        if let Some(department) = input.department {
            active.department = Set(Some(department));
        }
        if let Some(school) = input.school {
            active.school = Set(Some(school));
        }

        active.update(&self.db).await.map(Some)
    }

    /// Saves the storage key of the profile picture.
    ///
    /// Returns the previous key, or `None` if the organization does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_profile_picture(
        &self,
        id: i64,
        key: &str,
    ) -> Result<Option<Option<String>>, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let previous = org.profile_picture.clone();
        let mut active: organizations::ActiveModel = org.into();
        active.profile_picture = Set(Some(key.to_string()));
        active.update(&self.db).await?;
        Ok(Some(previous))
    }
}

fn change(field: &'static str, old: Option<&str>, new: Option<&str>) -> FieldChange {
    FieldChange {
        field,
        old_value: old.map(str::to_string),
        new_value: new.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(
            !ProfileUpdate {
                school: Some("LSPU".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_change_helper() {
        let c = change("password", None, Some("[UPDATED]"));
        assert_eq!(c.field, "password");
        assert!(c.old_value.is_none());
        assert_eq!(c.new_value.as_deref(), Some("[UPDATED]"));
    }
}
