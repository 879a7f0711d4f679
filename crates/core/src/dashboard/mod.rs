//! Organization dashboard figures.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::reports::{LineItem, LineItemKind};

/// Headline numbers on the organization dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Folder budgets plus all income less all expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_balance: Decimal,
    /// Distinct event names on generated reports.
    pub total_events: usize,
    /// Income dated in the current month.
    #[serde(with = "rust_decimal::serde::float")]
    pub income_month: Decimal,
    /// Expenses dated in the current month.
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses_month: Decimal,
}

impl DashboardSummary {
    /// Computes the summary.
    ///
    /// Event names are compared trimmed and case-insensitively; blank names
    /// are ignored.
    #[must_use]
    pub fn compute<'a>(
        folder_budgets: impl IntoIterator<Item = Decimal>,
        items: &[LineItem],
        event_names: impl IntoIterator<Item = &'a str>,
        today: NaiveDate,
    ) -> Self {
        let budgets: Decimal = folder_budgets.into_iter().sum();
        let net: Decimal = items.iter().map(LineItem::signed_amount).sum();

        let this_month = |item: &&LineItem| {
            item.date_issued
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        };
        let month_total = |kind: LineItemKind| -> Decimal {
            items
                .iter()
                .filter(|i| i.kind == kind)
                .filter(this_month)
                .map(LineItem::line_total)
                .sum()
        };

        let events: HashSet<String> = event_names
            .into_iter()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self {
            total_balance: budgets + net,
            total_events: events.len(),
            income_month: month_total(LineItemKind::Income),
            expenses_month: month_total(LineItemKind::Expense),
        }
    }
}
