//! Header text shared by report previews, print data and archive downloads.

use orgfin_core::reports::{college_name, report_month_text};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::entities::{departments, months, organizations, wallet_budgets};

/// Organization and month text printed at the top of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeading {
    /// Organization name.
    pub org_name: String,
    /// Upper-cased department name, or `COLLEGE`.
    pub college_name: String,
    /// Month text such as `AUGUST 2025`; empty when the folder is gone.
    pub report_month_text: String,
}

/// Reads the heading of a report.
#[derive(Debug, Clone)]
pub struct ReportContextRepository {
    db: DatabaseConnection,
}

impl ReportContextRepository {
    /// Creates a new report context repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Heading for a report of `organization_id` on folder `budget_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn heading(
        &self,
        organization_id: i64,
        budget_id: Option<i64>,
    ) -> Result<ReportHeading, DbErr> {
        let org = organizations::Entity::find_by_id(organization_id)
            .find_also_related(departments::Entity)
            .one(&self.db)
            .await?;

        let (org_name, dept_name) = match org {
            Some((org, dept)) => (org.org_name, dept.map(|d| d.dept_name)),
            None => (String::new(), None),
        };

        let month_text = match budget_id {
            Some(id) => wallet_budgets::Entity::find_by_id(id)
                .find_also_related(months::Entity)
                .one(&self.db)
                .await?
                .and_then(|(folder, month)| {
                    month.map(|m| report_month_text(&m.month_name, folder.year))
                })
                .unwrap_or_default(),
            None => String::new(),
        };

        Ok(ReportHeading {
            org_name,
            college_name: college_name(dept_name.as_deref()),
            report_month_text: month_text,
        })
    }
}
