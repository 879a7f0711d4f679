//! Department repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::departments;

/// Department repository.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    db: DatabaseConnection,
}

impl DepartmentRepository {
    /// Creates a new department repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all departments by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<departments::Model>, DbErr> {
        departments::Entity::find()
            .order_by_asc(departments::Column::DeptName)
            .all(&self.db)
            .await
    }

    /// Finds a department by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<departments::Model>, DbErr> {
        departments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Returns the department with this name, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn ensure(&self, name: &str) -> Result<departments::Model, DbErr> {
        if let Some(existing) = departments::Entity::find()
            .filter(departments::Column::DeptName.eq(name))
            .one(&self.db)
            .await?
        {
            return Ok(existing);
        }

        departments::ActiveModel {
            dept_name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }
}
