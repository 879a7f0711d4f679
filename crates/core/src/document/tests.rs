//! Tests for template filling.

use std::io::Cursor;

use chrono::NaiveDate;
use docx_rs::{DocumentChild, Docx, Paragraph, Run, Table, TableCell, TableRow, read_docx};
use rust_decimal_macros::dec;

use super::render::{paragraph_text, row_texts};
use super::*;
use crate::reports::LineItemKind;

fn cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}

fn row(texts: &[&str]) -> TableRow {
    TableRow::new(texts.iter().map(|t| cell(t)).collect())
}

fn template() -> Vec<u8> {
    let expenses = Table::new(vec![
        row(&["LIQUIDATION OF EXPENSES", "", "", "", ""]),
        row(&["Date Issued", "Qty", "Particulars", "Description", "Amount"]),
        row(&["sample", "1", "sample", "sample", "PHP 0.00"]),
        row(&["sample", "1", "sample", "sample", "PHP 0.00"]),
        row(&["", "", "", "TOTAL", ""]),
    ]);
    let incomes = Table::new(vec![
        row(&["INCOME", "", "", "", ""]),
        row(&["DATE ISSUED", "QTY", "TYPE OF INCOME", "DESCRIPTION", "AMOUNT"]),
        row(&["", "", "", "TOTAL", ""]),
    ]);

    let docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("{{COLLEGE_NAME}}")))
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Organization: {{ORG_"))
                .add_run(Run::new().add_text("NAME}}")),
        )
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text("Report {{REPORT_NO}} for {{REPORT_MONTH}}")),
        )
        .add_table(expenses)
        .add_table(incomes)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Remaining {{TOTAL_REMAINING}}; income {{TOTAL_INCOME}}")),
        );

    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

fn item(kind: LineItemKind, day: u32, qty: i32, label: &str, price: rust_decimal::Decimal) -> LineItem {
    LineItem {
        kind,
        date_issued: NaiveDate::from_ymd_opt(2025, 9, day),
        quantity: qty,
        particulars: (kind == LineItemKind::Expense).then(|| label.to_string()),
        income_type: (kind == LineItemKind::Income).then(|| label.to_string()),
        description: Some(format!("{label} desc")),
        price,
    }
}

fn header() -> ReportHeader {
    ReportHeader {
        college_name: "COLLEGE OF ENGINEERING".to_string(),
        org_name: "Math Society".to_string(),
        event_name: "Math Week".to_string(),
        report_month: "SEPTEMBER 2025".to_string(),
        date_prepared: "2025-09-30".to_string(),
        report_no: "2025-4".to_string(),
        budget: dec!(10000),
        total_expense: dec!(7250.5),
        reimbursement: dec!(500),
        previous_fund: dec!(1200),
        remaining: dec!(3449.5),
        total_income: Some(dec!(1500)),
        budget_in_the_bank: Some(dec!(0)),
    }
}

fn content(layout: ReceiptLayout) -> ReportContent {
    ReportContent {
        header: header(),
        expenses: vec![
            item(LineItemKind::Expense, 1, 2, "Bond paper", dec!(250)),
            item(LineItemKind::Expense, 1, 1, "Ink", dec!(450.5)),
            item(LineItemKind::Expense, 3, 10, "Snacks", dec!(30)),
        ],
        incomes: Some(vec![item(LineItemKind::Income, 2, 30, "Membership fee", dec!(50))]),
        receipts: Vec::new(),
        layout,
    }
}

struct Rendered {
    paragraphs: Vec<String>,
    tables: Vec<Vec<Vec<String>>>,
}

fn inspect(bytes: &[u8]) -> Rendered {
    let docx = read_docx(bytes).unwrap();
    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
            DocumentChild::Table(t) => tables.push(t.rows.iter().map(row_texts).collect()),
            _ => {}
        }
    }
    Rendered { paragraphs, tables }
}

fn png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([200, 10, 10]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn test_header_placeholders_replaced() {
    let out = render_report(&template(), &content(ReceiptLayout::Inline)).unwrap();
    let doc = inspect(&out);

    assert_eq!(doc.paragraphs[0], "COLLEGE OF ENGINEERING");
    assert_eq!(doc.paragraphs[1], "Organization: Math Society");
    assert_eq!(doc.paragraphs[2], "Report 2025-4 for SEPTEMBER 2025");
    assert_eq!(
        doc.paragraphs[3],
        "Remaining PHP 3,449.50; income PHP 1,500.00"
    );
    assert!(doc.paragraphs.iter().all(|p| !p.contains("{{")));
}

#[test]
fn test_expense_table_filled_before_summary() {
    let out = render_report(&template(), &content(ReceiptLayout::Inline)).unwrap();
    let expenses = &inspect(&out).tables[0];

    assert_eq!(expenses.len(), 6);
    assert_eq!(expenses[1][0], "Date Issued");
    assert_eq!(
        expenses[2],
        ["2025-09-01", "2", "Bond paper", "Bond paper desc", "PHP 500.00"]
    );
    // Same date as the row above is left blank.
    assert_eq!(expenses[3][0], "");
    assert_eq!(expenses[3][4], "PHP 450.50");
    assert_eq!(expenses[4][0], "2025-09-03");
    assert_eq!(expenses[4][4], "PHP 300.00");
    assert_eq!(expenses[5][3], "TOTAL");
    assert_eq!(expenses[5][4], "PHP 7,250.50");
}

#[test]
fn test_income_table_uses_unit_price() {
    let out = render_report(&template(), &content(ReceiptLayout::Inline)).unwrap();
    let incomes = &inspect(&out).tables[1];

    assert_eq!(incomes.len(), 4);
    assert_eq!(
        incomes[2],
        ["2025-09-02", "30", "Membership fee", "Membership fee desc", "PHP 50.00"]
    );
    assert_eq!(incomes[3][3], "TOTAL");
}

#[test]
fn test_archive_leaves_income_table_and_preview_fields() {
    let mut archived = content(ReceiptLayout::Appendix);
    archived.incomes = None;
    archived.header.total_income = None;
    archived.header.budget_in_the_bank = None;

    let out = render_report(&template(), &archived).unwrap();
    let doc = inspect(&out);

    assert_eq!(doc.tables[1].len(), 3);
    assert!(doc.paragraphs[3].contains("{{TOTAL_INCOME}}"));
    assert!(doc.paragraphs[3].starts_with("Remaining PHP 3,449.50"));
}

#[test]
fn test_inline_receipts_are_captioned() {
    let mut with_receipts = content(ReceiptLayout::Inline);
    with_receipts.receipts = vec![
        ReceiptImage {
            caption: "2025-09-01 - Bond paper".to_string(),
            bytes: png(),
        },
        ReceiptImage {
            caption: "2025-09-03 - corrupted".to_string(),
            bytes: b"not an image".to_vec(),
        },
    ];

    let out = render_report(&template(), &with_receipts).unwrap();
    let doc = inspect(&out);

    assert!(doc.paragraphs.iter().any(|p| p == "2025-09-01 - Bond paper"));
    assert!(!doc.paragraphs.iter().any(|p| p.contains("corrupted")));
    assert!(!doc.paragraphs.iter().any(|p| p.contains("APPENDIX")));
}

#[test]
fn test_appendix_heading() {
    let mut with_receipts = content(ReceiptLayout::Appendix);
    with_receipts.receipts = vec![ReceiptImage {
        caption: "2025-09-01 - Bond paper".to_string(),
        bytes: png(),
    }];

    let out = render_report(&template(), &with_receipts).unwrap();
    let doc = inspect(&out);

    let heading = doc
        .paragraphs
        .iter()
        .position(|p| p == "APPENDIX: RECEIPTS")
        .unwrap();
    assert_eq!(doc.paragraphs[heading + 1], "2025-09-01 - Bond paper");
}

#[test]
fn test_invalid_template() {
    let err = render_report(b"plain text", &content(ReceiptLayout::Inline)).unwrap_err();
    assert!(matches!(err, TemplateError::Read(_)));
}

#[test]
fn test_receipt_layout_widths() {
    assert_eq!(ReceiptLayout::Inline.image_width_inches(), 3);
    assert_eq!(ReceiptLayout::Appendix.image_width_inches(), 4);
}

#[test]
fn test_placeholders_without_preview_fields() {
    let mut h = header();
    h.total_income = None;
    h.budget_in_the_bank = None;
    let keys: Vec<&str> = h.placeholders().iter().map(|(k, _)| *k).collect();
    assert_eq!(keys.len(), 11);
    assert!(!keys.contains(&"{{TOTAL_INCOME}}"));
    assert_eq!(header().placeholders().len(), 13);
}
