//! Report print data and DOCX documents shared by the OSAS and organization routes.

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use orgfin_core::document::{
    DOCX_CONTENT_TYPE, ReceiptImage, ReceiptLayout, ReportContent, ReportHeader, render_report,
};
use orgfin_core::reports::{LineItem, LineItemKind, ReceiptItem};
use orgfin_core::storage::StorageService;
use orgfin_db::entities::{financial_reports, wallet_receipts};
use orgfin_db::repositories::{
    ArchiveWithItems, ReceiptRepository, ReportContextRepository, ReportHeading,
    TransactionRepository,
};
use serde_json::{Value, json};
use tracing::warn;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{date_opt, money};

/// A report snapshot with the live rows of its folder.
#[derive(Debug, Clone)]
pub struct LiveReport {
    /// The snapshot row.
    pub report: financial_reports::Model,
    /// Organization, college and month text.
    pub heading: ReportHeading,
    /// Expense lines by date issued.
    pub expenses: Vec<LineItem>,
    /// Income lines by date issued.
    pub incomes: Vec<LineItem>,
    /// Receipts by receipt date.
    pub receipts: Vec<wallet_receipts::Model>,
}

impl LiveReport {
    /// Loads the folder rows behind a snapshot.
    ///
    /// # Errors
    ///
    /// Returns 400 if the row is a master report, or a database error.
    pub async fn load(state: &AppState, report: financial_reports::Model) -> ApiResult<Self> {
        let (Some(wallet_id), Some(budget_id)) = (report.wallet_id, report.budget_id) else {
            return Err(ApiError::bad_request(
                "Report missing wallet or budget information",
            ));
        };

        let db = (*state.db).clone();
        let heading = ReportContextRepository::new(db.clone())
            .heading(report.organization_id, Some(budget_id))
            .await?;

        let transactions = TransactionRepository::new(db.clone());
        let expenses = transactions
            .list_for_folder(wallet_id, budget_id, Some(LineItemKind::Expense))
            .await?
            .iter()
            .filter_map(|tx| tx.line_item())
            .collect();
        let incomes = transactions
            .list_for_folder(wallet_id, budget_id, Some(LineItemKind::Income))
            .await?
            .iter()
            .filter_map(|tx| tx.line_item())
            .collect();

        let receipts = ReceiptRepository::new(db)
            .list_for_report(wallet_id, budget_id)
            .await?;

        Ok(Self {
            report,
            heading,
            expenses,
            incomes,
            receipts,
        })
    }

    /// Data for the printable report view.
    pub async fn print_data(&self, storage: Option<&StorageService>) -> Value {
        let figures = self.report.figures();

        let transactions: Vec<Value> = self
            .expenses
            .iter()
            .map(|tx| {
                json!({
                    "date_issued": date_opt(tx.date_issued),
                    "quantity": tx.quantity,
                    "particulars": tx.particulars,
                    "description": tx.description,
                    "price": money(tx.price),
                    "kind": tx.kind,
                    "line_total": money(tx.line_total()),
                })
            })
            .collect();

        let incomes: Vec<Value> = self
            .incomes
            .iter()
            .map(|inc| {
                json!({
                    "date_issued": date_opt(inc.date_issued),
                    "quantity": inc.quantity,
                    "income_type": inc.income_type,
                    "description": inc.description,
                    "price": money(inc.price),
                    "kind": inc.kind,
                    "amount": money(inc.price),
                })
            })
            .collect();

        let mut receipts = Vec::with_capacity(self.receipts.len());
        for receipt in &self.receipts {
            receipts.push(json!({
                "description": receipt.description,
                "receipt_date": date_opt(receipt.receipt_date),
                "file_url": receipt_link(storage, &receipt.file_url).await,
            }));
        }

        json!({
            "report": self.report,
            "budget": money(figures.budget),
            "totalexpense": money(figures.total_expense),
            "reimbursement": money(figures.reimbursement),
            "previous_fund": money(figures.previous_fund),
            "remaining": money(figures.remaining()),
            "total_income": money(figures.total_income),
            "budget_in_the_bank": money(figures.budget_in_the_bank),
            "transactions": transactions,
            "incomes": incomes,
            "receipts": receipts,
            "org_name": self.heading.org_name,
            "college_name": self.heading.college_name,
            "report_month_text": self.heading.report_month_text,
        })
    }

    /// Fills the template with the snapshot and its live rows.
    ///
    /// # Errors
    ///
    /// Returns 503 without a template, or an error if rendering fails.
    pub async fn render(&self, state: &AppState) -> ApiResult<Vec<u8>> {
        let template = template(state)?;
        let figures = self.report.figures();

        let header = ReportHeader {
            college_name: self.heading.college_name.clone(),
            org_name: self.heading.org_name.clone(),
            event_name: self.report.event_name.clone().unwrap_or_default(),
            report_month: self.heading.report_month_text.clone(),
            date_prepared: format_date(self.report.date_prepared),
            report_no: self.report.report_no.clone().unwrap_or_default(),
            budget: figures.budget,
            total_expense: figures.total_expense,
            reimbursement: figures.reimbursement,
            previous_fund: figures.previous_fund,
            remaining: figures.remaining(),
            total_income: Some(figures.total_income),
            budget_in_the_bank: Some(figures.budget_in_the_bank),
        };

        let items = self.receipts.iter().map(wallet_receipts::Model::receipt_item);
        let content = ReportContent {
            header,
            expenses: self.expenses.clone(),
            incomes: Some(self.incomes.clone()),
            receipts: receipt_images(state.storage.as_deref(), items).await,
            layout: ReceiptLayout::Inline,
        };

        Ok(render_report(template, &content)?)
    }
}

/// Fills the template with a submitted archive.
///
/// # Errors
///
/// Returns 503 without a template, or an error if rendering fails.
pub async fn render_archive(
    state: &AppState,
    archived: &ArchiveWithItems,
    heading: &ReportHeading,
) -> ApiResult<Vec<u8>> {
    let template = template(state)?;
    let archive = &archived.archive;

    let header = ReportHeader {
        college_name: heading.college_name.clone(),
        org_name: heading.org_name.clone(),
        event_name: archive.event_name.clone().unwrap_or_default(),
        report_month: heading.report_month_text.clone(),
        date_prepared: format_date(archive.date_prepared),
        report_no: archive.report_no.clone().unwrap_or_default(),
        budget: archive.budget,
        total_expense: archive.total_expense,
        reimbursement: archive.reimbursement,
        previous_fund: archive.previous_fund,
        remaining: archive.remaining,
        total_income: None,
        budget_in_the_bank: None,
    };

    let expenses = archived
        .transactions
        .iter()
        .filter_map(|tx| tx.line_item())
        .filter(|item| item.kind == LineItemKind::Expense)
        .collect();
    let items = archived.receipts.iter().map(|r| r.receipt_item());

    let content = ReportContent {
        header,
        expenses,
        incomes: None,
        receipts: receipt_images(state.storage.as_deref(), items).await,
        layout: ReceiptLayout::Appendix,
    };

    Ok(render_report(template, &content)?)
}

/// DOCX response, either shown inline or offered as a download.
#[must_use]
pub fn docx_response(bytes: Vec<u8>, filename: &str, attachment: bool) -> Response {
    let disposition = format!(
        "{}; filename=\"{}\"",
        if attachment { "attachment" } else { "inline" },
        docx_filename(filename)
    );
    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(DOCX_CONTENT_TYPE),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// File name with a `.docx` extension and without quotes or path separators.
fn docx_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\') && !c.is_control())
        .collect();
    let base = if cleaned.is_empty() {
        "financial_report".to_string()
    } else {
        cleaned
    };
    if base.to_ascii_lowercase().ends_with(".docx") {
        base
    } else {
        format!("{base}.docx")
    }
}

fn template(state: &AppState) -> ApiResult<&[u8]> {
    state
        .report_template
        .as_deref()
        .map(Vec::as_slice)
        .ok_or_else(|| ApiError::unavailable("Report template is not configured"))
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Link to a stored receipt, empty when it cannot be produced.
pub async fn receipt_link(storage: Option<&StorageService>, key: &str) -> String {
    let Some(storage) = storage else {
        return String::new();
    };
    match storage.object_url(key, false).await {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, key, "Failed to build receipt URL");
            String::new()
        }
    }
}

/// Downloads receipt photos; receipts that cannot be fetched are skipped.
async fn receipt_images(
    storage: Option<&StorageService>,
    items: impl Iterator<Item = ReceiptItem>,
) -> Vec<ReceiptImage> {
    let Some(storage) = storage else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for item in items {
        match storage.download(&item.file_key).await {
            Ok(bytes) => images.push(ReceiptImage {
                caption: item.caption(),
                bytes,
            }),
            Err(e) => warn!(error = %e, key = %item.file_key, "Skipping receipt image"),
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-3", "2025-3.docx")]
    #[case("report.DOCX", "report.DOCX")]
    #[case("  ", "financial_report.docx")]
    #[case("a/b\"c", "abc.docx")]
    fn test_docx_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(docx_filename(input), expected);
    }

    #[test]
    fn test_docx_response_headers() {
        let response = docx_response(vec![1, 2, 3], "2025-1", true);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], DOCX_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"2025-1.docx\""
        );

        let response = docx_response(Vec::new(), "financial_report_preview", false);
        assert!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .starts_with("inline;")
        );
    }

    #[tokio::test]
    async fn test_receipt_link_without_storage() {
        assert_eq!(receipt_link(None, "a/b.png").await, "");
    }
}
