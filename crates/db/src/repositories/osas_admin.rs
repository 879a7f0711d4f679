//! OSAS admin repository: accounts, activity log, audit trail, sign-in
//! sessions and password reset tokens.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    osas_activity_log, osas_admin_audit, osas_admins, osas_password_resets, osas_sessions,
};

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Number of activity entries returned by [`OsasAdminRepository::list_activity`].
pub const ACTIVITY_PAGE_SIZE: u64 = 50;

/// Input for creating an admin account.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// Sign-in username.
    pub username: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Role label, e.g. `superadmin`.
    pub role: String,
}

/// Filter for the activity log.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    /// Only this action type. `all` means no filter.
    pub action_type: Option<String>,
    /// Only entries from this UTC day.
    pub date: Option<NaiveDate>,
}

/// Profile changes requested by an admin.
#[derive(Debug, Clone, Default)]
pub struct AdminProfileUpdate {
    /// New username.
    pub username: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
    /// New email.
    pub email: Option<String>,
}

/// OSAS admin repository.
#[derive(Debug, Clone)]
pub struct OsasAdminRepository {
    db: DatabaseConnection,
}

impl OsasAdminRepository {
    /// Creates a new OSAS admin repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an admin by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<osas_admins::Model>, DbErr> {
        osas_admins::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an admin by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<osas_admins::Model>, DbErr> {
        osas_admins::Entity::find()
            .filter(osas_admins::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Creates an admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewAdmin) -> Result<osas_admins::Model, DbErr> {
        osas_admins::ActiveModel {
            username: Set(input.username),
            password: Set(input.password_hash),
            full_name: Set(input.full_name),
            email: Set(input.email),
            role: Set(input.role),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Checks if a username belongs to an admin other than `except`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_taken(&self, username: &str, except: i64) -> Result<bool, DbErr> {
        let count = osas_admins::Entity::find()
            .filter(osas_admins::Column::Username.eq(username))
            .filter(osas_admins::Column::Id.ne(except))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Applies profile changes, writing one audit row per changed field.
    ///
    /// Returns the updated admin and the names of the changed fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn update_profile(
        &self,
        admin: osas_admins::Model,
        input: AdminProfileUpdate,
    ) -> Result<(osas_admins::Model, Vec<&'static str>), DbErr> {
        let txn = self.db.begin().await?;
        let admin_id = admin.id;
        let mut changed = Vec::new();
        let mut audits = Vec::new();
        let mut active: osas_admins::ActiveModel = admin.clone().into();

        if let Some(full_name) = input
            .full_name
            .filter(|n| !n.is_empty() && admin.full_name.as_deref() != Some(n.as_str()))
        {
            audits.push(audit_row(admin_id, "full_name", admin.full_name.clone(), Some(full_name.clone())));
            active.full_name = Set(Some(full_name));
            changed.push("full_name");
        }
        if let Some(email) = input
            .email
            .filter(|e| !e.is_empty() && admin.email.as_deref() != Some(e.as_str()))
        {
            audits.push(audit_row(admin_id, "email", admin.email.clone(), Some(email.clone())));
            active.email = Set(Some(email));
            changed.push("email");
        }
        if let Some(username) = input
            .username
            .filter(|u| !u.is_empty() && *u != admin.username)
        {
            audits.push(audit_row(
                admin_id,
                "username",
                Some(admin.username.clone()),
                Some(username.clone()),
            ));
            active.username = Set(username);
            changed.push("username");
        }

        let updated = if changed.is_empty() {
            admin
        } else {
            let updated = active.update(&txn).await?;
            osas_admin_audit::Entity::insert_many(audits).exec(&txn).await?;
            updated
        };

        txn.commit().await?;
        Ok((updated, changed))
    }

    /// Replaces an admin's password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_password(&self, admin_id: i64, password_hash: &str) -> Result<(), DbErr> {
        osas_admins::Entity::update_many()
            .col_expr(
                osas_admins::Column::Password,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .filter(osas_admins::Column::Id.eq(admin_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Appends an entry to the activity log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn log_activity(
        &self,
        admin_id: i64,
        action_type: &str,
        description: &str,
    ) -> Result<(), DbErr> {
        osas_activity_log::ActiveModel {
            admin_id: Set(Some(admin_id)),
            action_type: Set(action_type.to_string()),
            description: Set(description.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// Appends an entry to the admin audit trail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn log_audit(
        &self,
        admin_id: i64,
        field: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Result<(), DbErr> {
        audit_row(admin_id, field, old_value, new_value)
            .insert(&self.db)
            .await?;
        Ok(())
    }

    /// Latest activity entries of an admin, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_activity(
        &self,
        admin_id: i64,
        filter: &ActivityFilter,
    ) -> Result<Vec<osas_activity_log::Model>, DbErr> {
        let mut query = osas_activity_log::Entity::find()
            .filter(osas_activity_log::Column::AdminId.eq(admin_id));

        if let Some(action) = filter
            .action_type
            .as_deref()
            .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("all"))
        {
            query = query.filter(osas_activity_log::Column::ActionType.eq(action));
        }
        if let Some((start, end)) = filter.date.and_then(day_bounds) {
            query = query
                .filter(osas_activity_log::Column::CreatedAt.gte(start))
                .filter(osas_activity_log::Column::CreatedAt.lt(end));
        }

        query
            .order_by_desc(osas_activity_log::Column::CreatedAt)
            .limit(ACTIVITY_PAGE_SIZE)
            .all(&self.db)
            .await
    }

    /// Records a sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record_session(
        &self,
        admin_id: i64,
        device_info: &str,
        ip_address: &str,
    ) -> Result<osas_sessions::Model, DbErr> {
        osas_sessions::ActiveModel {
            admin_id: Set(admin_id),
            device_info: Set(Some(device_info.to_string())),
            ip_address: Set(Some(ip_address.to_string())),
            last_active_at: Set(Utc::now().into()),
            is_current: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Marks the admin's sessions from this device and address as ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn end_sessions(
        &self,
        admin_id: i64,
        device_info: &str,
        ip_address: &str,
    ) -> Result<u64, DbErr> {
        let result = osas_sessions::Entity::update_many()
            .col_expr(
                osas_sessions::Column::IsCurrent,
                sea_orm::sea_query::Expr::value(false),
            )
            .col_expr(
                osas_sessions::Column::LastActiveAt,
                sea_orm::sea_query::Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(
                    Utc::now(),
                )),
            )
            .filter(osas_sessions::Column::AdminId.eq(admin_id))
            .filter(osas_sessions::Column::DeviceInfo.eq(device_info))
            .filter(osas_sessions::Column::IpAddress.eq(ip_address))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Sign-in sessions of an admin, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_sessions(&self, admin_id: i64) -> Result<Vec<osas_sessions::Model>, DbErr> {
        osas_sessions::Entity::find()
            .filter(osas_sessions::Column::AdminId.eq(admin_id))
            .order_by_desc(osas_sessions::Column::LastActiveAt)
            .all(&self.db)
            .await
    }

    /// Issues a password reset token valid for [`RESET_TOKEN_TTL_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_reset_token(&self, admin_id: i64) -> Result<String, DbErr> {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();

        osas_password_resets::ActiveModel {
            admin_id: Set(admin_id),
            token: Set(token.clone()),
            expires_at: Set((now + Duration::hours(RESET_TOKEN_TTL_HOURS)).into()),
            used: Set(false),
            created_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(token)
    }

    /// Consumes an unused, unexpired reset token and stores the new password.
    ///
    /// Returns the admin ID, or `None` if the token is unknown, used or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(reset) = osas_password_resets::Entity::find()
            .filter(osas_password_resets::Column::Token.eq(token))
            .filter(osas_password_resets::Column::Used.eq(false))
            .filter(osas_password_resets::Column::ExpiresAt.gt(now))
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        let admin_id = reset.admin_id;
        let mut active: osas_password_resets::ActiveModel = reset.into();
        active.used = Set(true);
        active.update(&txn).await?;

        osas_admins::Entity::update_many()
            .col_expr(
                osas_admins::Column::Password,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .filter(osas_admins::Column::Id.eq(admin_id))
            .exec(&txn)
            .await?;

        audit_row(admin_id, "password", None, Some("[RESET]".to_string()))
            .insert(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(admin_id))
    }
}

fn audit_row(
    admin_id: i64,
    field: &str,
    old_value: Option<String>,
    new_value: Option<String>,
) -> osas_admin_audit::ActiveModel {
    osas_admin_audit::ActiveModel {
        admin_id: Set(Some(admin_id)),
        changed_field: Set(field.to_string()),
        old_value: Set(old_value),
        new_value: Set(new_value),
        changed_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

/// Start and end (exclusive) of a UTC day.
fn day_bounds(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date.and_hms_opt(0, 0, 0)?.and_utc();
    Some((start, start + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2025, 10, 3).unwrap()).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-10-03T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_audit_row_fields() {
        let row = audit_row(7, "email", None, Some("a@b.c".to_string()));
        assert_eq!(row.admin_id, Set(Some(7)));
        assert_eq!(row.changed_field, Set("email".to_string()));
        assert_eq!(row.new_value, Set(Some("a@b.c".to_string())));
    }
}
