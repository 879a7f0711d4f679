//! Liquidation report documents.
//!
//! Reports are produced from a Word template. Header placeholders such as
//! `{{ORG_NAME}}` are replaced, the expense and income tables are filled
//! with the month's line items and receipt photos are appended at the end.

mod error;
mod render;

#[cfg(test)]
mod tests;

use rust_decimal::Decimal;

pub use error::TemplateError;
pub use render::render_report;

use crate::reports::LineItem;
use orgfin_shared::types::format_php;

/// MIME type of generated reports.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Values substituted into the template header.
#[derive(Debug, Clone, Default)]
pub struct ReportHeader {
    /// College line, already upper-cased.
    pub college_name: String,
    /// Organization name.
    pub org_name: String,
    /// Event name.
    pub event_name: String,
    /// Month text such as `AUGUST 2025`.
    pub report_month: String,
    /// Date prepared, `YYYY-MM-DD`.
    pub date_prepared: String,
    /// Report number.
    pub report_no: String,
    /// Budget.
    pub budget: Decimal,
    /// Total expense, also written to the expense table summary row.
    pub total_expense: Decimal,
    /// Reimbursement.
    pub reimbursement: Decimal,
    /// Previous fund.
    pub previous_fund: Decimal,
    /// Remaining fund.
    pub remaining: Decimal,
    /// Total income; only live previews carry it.
    pub total_income: Option<Decimal>,
    /// Cash in the bank; only live previews carry it.
    pub budget_in_the_bank: Option<Decimal>,
}

impl ReportHeader {
    /// Placeholder → replacement pairs.
    #[must_use]
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(13);
        if let Some(total_income) = self.total_income {
            pairs.push(("{{TOTAL_INCOME}}", format_php(total_income)));
        }
        if let Some(in_bank) = self.budget_in_the_bank {
            pairs.push(("{{BUDGET_IN_THE_BANK}}", format_php(in_bank)));
        }
        pairs.extend([
            ("{{COLLEGE_NAME}}", self.college_name.clone()),
            ("{{ORG_NAME}}", self.org_name.clone()),
            ("{{EVENT_NAME}}", self.event_name.clone()),
            ("{{REPORT_MONTH}}", self.report_month.clone()),
            ("{{DATE_PREPARED}}", self.date_prepared.clone()),
            ("{{REPORT_NO}}", self.report_no.clone()),
            ("{{BUDGET}}", format_php(self.budget)),
            ("{{TOTAL_EXPENSE}}", format_php(self.total_expense)),
            ("{{REIMBURSEMENT}}", format_php(self.reimbursement)),
            ("{{PREVIOUS_FUND}}", format_php(self.previous_fund)),
            ("{{TOTAL_REMAINING}}", format_php(self.remaining)),
        ]);
        pairs
    }
}

/// How receipt photos are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptLayout {
    /// Captioned photos right after the tables, 3 inches wide.
    Inline,
    /// A page break and an `APPENDIX: RECEIPTS` heading, photos 4 inches wide.
    Appendix,
}

impl ReceiptLayout {
    /// Photo width in inches.
    #[must_use]
    pub const fn image_width_inches(&self) -> u32 {
        match self {
            Self::Inline => 3,
            Self::Appendix => 4,
        }
    }
}

/// A downloaded receipt photo.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    /// Caption, `{date} - {description}`.
    pub caption: String,
    /// Raw image bytes as stored.
    pub bytes: Vec<u8>,
}

/// Everything the template is filled with.
#[derive(Debug, Clone)]
pub struct ReportContent {
    /// Header placeholders.
    pub header: ReportHeader,
    /// Expense rows, in date order.
    pub expenses: Vec<LineItem>,
    /// Income rows, in date order. Archived reports leave the income table as is.
    pub incomes: Option<Vec<LineItem>>,
    /// Receipt photos.
    pub receipts: Vec<ReceiptImage>,
    /// Receipt layout.
    pub layout: ReceiptLayout,
}
