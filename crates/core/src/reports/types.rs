//! Report figures, line items and snapshot types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money figures entered on a liquidation report.
///
/// Missing values are treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFigures {
    /// Budget allotted for the month.
    pub budget: Decimal,
    /// Total income for the month.
    pub total_income: Decimal,
    /// Total expense for the month.
    pub total_expense: Decimal,
    /// Amount reimbursed.
    pub reimbursement: Decimal,
    /// Fund carried over from the previous month.
    pub previous_fund: Decimal,
    /// Cash deposited in the bank.
    pub budget_in_the_bank: Decimal,
}

impl ReportFigures {
    /// Builds figures from nullable columns.
    #[must_use]
    pub fn from_optional(
        budget: Option<Decimal>,
        total_income: Option<Decimal>,
        total_expense: Option<Decimal>,
        reimbursement: Option<Decimal>,
        previous_fund: Option<Decimal>,
        budget_in_the_bank: Option<Decimal>,
    ) -> Self {
        Self {
            budget: budget.unwrap_or_default(),
            total_income: total_income.unwrap_or_default(),
            total_expense: total_expense.unwrap_or_default(),
            reimbursement: reimbursement.unwrap_or_default(),
            previous_fund: previous_fund.unwrap_or_default(),
            budget_in_the_bank: budget_in_the_bank.unwrap_or_default(),
        }
    }

    /// Remaining fund: budget less expense and reimbursement, plus the carried-over fund.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.budget - self.total_expense - self.reimbursement + self.previous_fund
    }
}

/// Whether a wallet transaction brings money in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemKind {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl LineItemKind {
    /// Returns the kind as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for LineItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LineItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("Invalid kind: {other}")),
        }
    }
}

/// One income or expense row of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Income or expense.
    pub kind: LineItemKind,
    /// Date issued.
    pub date_issued: Option<NaiveDate>,
    /// Quantity.
    pub quantity: i32,
    /// Expense particulars.
    pub particulars: Option<String>,
    /// Income type.
    pub income_type: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
}

impl LineItem {
    /// Quantity times unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    /// Line total signed by kind: income positive, expense negative.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            LineItemKind::Income => self.line_total(),
            LineItemKind::Expense => -self.line_total(),
        }
    }

    /// The label shown in the third column of the report table.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.kind {
            LineItemKind::Income => self.income_type.as_deref(),
            LineItemKind::Expense => self.particulars.as_deref(),
        }
        .unwrap_or_default()
    }
}

/// A receipt image attached to a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptItem {
    /// Caption text.
    pub description: Option<String>,
    /// Receipt date.
    pub receipt_date: Option<NaiveDate>,
    /// Object key in the receipts bucket.
    pub file_key: String,
}

impl ReceiptItem {
    /// Caption shown above the receipt image: `{date} - {description}`.
    #[must_use]
    pub fn caption(&self) -> String {
        let date = self
            .receipt_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!("{date} - {}", self.description.as_deref().unwrap_or_default())
    }
}

/// The pending per-wallet snapshot an organization submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    /// Report row ID.
    pub report_id: i64,
    /// Owning organization.
    pub organization_id: i64,
    /// Organization name, used in the OSAS notification.
    pub organization_name: String,
    /// Wallet the snapshot belongs to.
    pub wallet_id: i64,
    /// Month folder the snapshot belongs to.
    pub budget_id: Option<i64>,
    /// Report number, e.g. `2025-3`.
    pub report_no: Option<String>,
    /// Event name.
    pub event_name: Option<String>,
    /// Date the report was prepared.
    pub date_prepared: Option<NaiveDate>,
    /// Money figures.
    pub figures: ReportFigures,
}

/// Everything needed to write the archive and reset the live month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// The snapshot being submitted.
    pub snapshot: PendingSnapshot,
    /// Remaining fund captured on the archive row.
    pub remaining: Decimal,
    /// Submission date written on the report.
    pub submitted_on: NaiveDate,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    /// Submitted report ID.
    pub report_id: i64,
    /// New archive ID.
    pub archive_id: i64,
    /// Whether OSAS was notified.
    pub notified: bool,
}
