//! OSAS notification repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::osas_notifications;

/// Number of notifications shown in the OSAS bell.
pub const NOTIFICATION_PAGE_SIZE: u64 = 20;

/// OSAS notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Latest notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest(&self) -> Result<Vec<osas_notifications::Model>, DbErr> {
        osas_notifications::Entity::find()
            .order_by_desc(osas_notifications::Column::CreatedAt)
            .limit(NOTIFICATION_PAGE_SIZE)
            .all(&self.db)
            .await
    }

    /// Marks a notification as read. Returns false if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_read(&self, id: i64) -> Result<bool, DbErr> {
        let result = osas_notifications::Entity::update_many()
            .col_expr(
                osas_notifications::Column::IsRead,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(osas_notifications::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Inserts an unread notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        org_id: i64,
        report_id: i64,
        org_name: &str,
        message: &str,
    ) -> Result<osas_notifications::Model, DbErr> {
        osas_notifications::ActiveModel {
            org_id: Set(Some(org_id)),
            report_id: Set(Some(report_id)),
            org_name: Set(Some(org_name.to_string())),
            message: Set(message.to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(conn)
        .await
    }
}

/// Whether any of the notifications is unread.
#[must_use]
pub fn has_unread(notifications: &[osas_notifications::Model]) -> bool {
    notifications.iter().any(|n| !n.is_read)
}
