//! Filling the DOCX template.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Pic, Run, RunChild,
    Table, TableCell, TableCellContent, TableChild, TableRow, TableRowChild, read_docx,
};
use image::ImageFormat;
use rust_decimal::Decimal;

use super::error::TemplateError;
use super::{ReceiptImage, ReceiptLayout, ReportContent};
use crate::reports::LineItem;
use orgfin_shared::types::format_php;

const EMU_PER_INCH: u32 = 914_400;

/// Header text of the expense table.
const EXPENSE_HEADERS: [&str; 2] = ["DATE ISSUED", "PARTICULARS"];
/// Header text of the income table.
const INCOME_HEADERS: [&str; 2] = ["TYPE OF INCOME", "DATE ISSUED"];

/// Rows kept from a template table: title, column headers and the summary row.
const TEMPLATE_TABLE_ROWS: usize = 3;

/// Fills the template and returns the packed document.
///
/// Receipt photos that cannot be decoded are skipped.
///
/// # Errors
///
/// Returns `TemplateError::Read` if the template cannot be parsed and
/// `TemplateError::Write` if the result cannot be packed.
pub fn render_report(template: &[u8], content: &ReportContent) -> Result<Vec<u8>, TemplateError> {
    let mut docx = read_docx(template).map_err(|e| TemplateError::Read(e.to_string()))?;

    let placeholders = content.header.placeholders();
    for child in &mut docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => replace_in_paragraph(p, &placeholders),
            DocumentChild::Table(t) => replace_in_table(t, &placeholders),
            _ => {}
        }
    }

    if let Some(table) = find_table(&mut docx, &EXPENSE_HEADERS) {
        fill_table(table, &content.expenses, LineItem::line_total);
        if let Some(cell) = summary_cell(table) {
            set_cell_text(cell, &format_php(content.header.total_expense));
        }
    }

    if let Some(incomes) = &content.incomes {
        if let Some(table) = find_table(&mut docx, &INCOME_HEADERS) {
            fill_table(table, incomes, |item| item.price);
        }
    }

    let docx = append_receipts(docx, &content.receipts, content.layout);

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| TemplateError::Write(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Concatenated text of a paragraph's runs.
pub(crate) fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

/// Text of a table cell, paragraphs joined by newlines.
pub(crate) fn cell_text(cell: &TableCell) -> String {
    cell.children
        .iter()
        .filter_map(|c| match c {
            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of each cell in a row.
pub(crate) fn row_texts(row: &TableChild) -> Vec<String> {
    let TableChild::TableRow(row) = row;
    row.cells
        .iter()
        .map(|c| {
            let TableRowChild::TableCell(cell) = c;
            cell_text(cell)
        })
        .collect()
}

fn replace_all(text: &str, placeholders: &[(&str, String)]) -> String {
    placeholders
        .iter()
        .fold(text.to_string(), |acc, (key, value)| acc.replace(key, value))
}

fn has_placeholder(text: &str, placeholders: &[(&str, String)]) -> bool {
    placeholders.iter().any(|(key, _)| text.contains(key))
}

fn text_nodes(paragraph: &mut Paragraph) -> impl Iterator<Item = &mut docx_rs::Text> {
    paragraph.children.iter_mut().flat_map(|child| match child {
        ParagraphChild::Run(run) => run
            .children
            .iter_mut()
            .filter_map(|rc| match rc {
                RunChild::Text(t) => Some(t),
                _ => None,
            })
            .collect::<Vec<_>>(),
        _ => Vec::new(),
    })
}

/// Replaces placeholders run by run. Word often splits a token across runs;
/// in that case the paragraph text is collapsed into its first run, which
/// keeps that run's formatting.
fn replace_in_paragraph(paragraph: &mut Paragraph, placeholders: &[(&str, String)]) {
    if !has_placeholder(&paragraph_text(paragraph), placeholders) {
        return;
    }

    for t in text_nodes(paragraph) {
        if has_placeholder(&t.text, placeholders) {
            *t = docx_rs::Text::new(replace_all(&t.text, placeholders));
        }
    }

    let remaining = paragraph_text(paragraph);
    if !has_placeholder(&remaining, placeholders) {
        return;
    }

    let collapsed = replace_all(&remaining, placeholders);
    for (i, t) in text_nodes(paragraph).enumerate() {
        if i == 0 {
            *t = docx_rs::Text::new(collapsed.as_str());
        } else {
            t.text.clear();
        }
    }
}

fn replace_in_table(table: &mut Table, placeholders: &[(&str, String)]) {
    for row in &mut table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &mut row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(p) => replace_in_paragraph(p, placeholders),
                    TableCellContent::Table(t) => replace_in_table(t, placeholders),
                    _ => {}
                }
            }
        }
    }
}

/// First top-level table whose second row mentions every header.
fn find_table<'a>(docx: &'a mut Docx, headers: &[&str]) -> Option<&'a mut Table> {
    docx.document.children.iter_mut().find_map(|child| match child {
        DocumentChild::Table(table) => {
            let header_row = table.rows.get(1)?;
            let text = row_texts(header_row).join(" ").to_uppercase();
            headers
                .iter()
                .all(|h| text.contains(h))
                .then_some(&mut **table)
        }
        _ => None,
    })
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn set_cell_text(cell: &mut TableCell, text: &str) {
    let first_paragraph = cell
        .children
        .iter()
        .position(|c| matches!(c, TableCellContent::Paragraph(_)));
    match first_paragraph {
        Some(idx) => {
            if let TableCellContent::Paragraph(p) = &mut cell.children[idx] {
                p.children = vec![ParagraphChild::Run(Box::new(Run::new().add_text(text)))];
            }
            let mut seen = 0usize;
            cell.children.retain(|c| {
                if matches!(c, TableCellContent::Paragraph(_)) {
                    seen += 1;
                    seen == 1
                } else {
                    true
                }
            });
        }
        None => cell
            .children
            .push(TableCellContent::Paragraph(Box::new(text_paragraph(text)))),
    }
}

fn summary_cell(table: &mut Table) -> Option<&mut TableCell> {
    let TableChild::TableRow(row) = table.rows.last_mut()?;
    let TableRowChild::TableCell(cell) = row.cells.last_mut()?;
    Some(cell)
}

/// Drops the template's sample rows and inserts one row per item above the summary row.
fn fill_table(table: &mut Table, items: &[LineItem], amount: impl Fn(&LineItem) -> Decimal) {
    while table.rows.len() > TEMPLATE_TABLE_ROWS {
        table.rows.remove(2);
    }

    let mut last_date = None;
    let rows: Vec<TableChild> = items
        .iter()
        .map(|item| {
            let date = if item.date_issued == last_date {
                String::new()
            } else {
                last_date = item.date_issued;
                item.date_issued
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            let quantity = if item.quantity == 0 {
                String::new()
            } else {
                item.quantity.to_string()
            };
            let cells = [
                date,
                quantity,
                item.label().to_string(),
                item.description.clone().unwrap_or_default(),
                format_php(amount(item)),
            ]
            .iter()
            .map(|text| TableCell::new().add_paragraph(text_paragraph(text)))
            .collect();
            TableChild::TableRow(TableRow::new(cells))
        })
        .collect();

    let insert_at = table.rows.len().saturating_sub(1);
    table.rows.splice(insert_at..insert_at, rows);
}

fn receipt_picture(bytes: &[u8], width_inches: u32) -> Result<Pic, TemplateError> {
    let img = image::load_from_memory(bytes).map_err(|e| TemplateError::Image(e.to_string()))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(TemplateError::Image("empty image".to_string()));
    }

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| TemplateError::Image(e.to_string()))?;

    let width_emu = width_inches * EMU_PER_INCH;
    let height_emu = u32::try_from(u64::from(width_emu) * u64::from(height) / u64::from(width))
        .unwrap_or(u32::MAX);

    Ok(Pic::new(&png.into_inner()).size(width_emu, height_emu))
}

fn append_receipts(mut docx: Docx, receipts: &[ReceiptImage], layout: ReceiptLayout) -> Docx {
    if receipts.is_empty() {
        return docx;
    }

    if layout == ReceiptLayout::Appendix {
        docx = docx
            .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text("APPENDIX: RECEIPTS").bold()),
            );
    }

    for receipt in receipts {
        let pic = match receipt_picture(&receipt.bytes, layout.image_width_inches()) {
            Ok(pic) => pic,
            Err(e) => {
                tracing::warn!(error = %e, caption = %receipt.caption, "Skipping receipt image");
                continue;
            }
        };

        let mut caption = text_paragraph(&receipt.caption);
        let mut image = Paragraph::new().add_run(Run::new().add_image(pic));
        let mut spacer = Paragraph::new();
        if layout == ReceiptLayout::Inline {
            caption = caption.align(AlignmentType::Center);
            image = image.align(AlignmentType::Center);
            spacer = spacer.align(AlignmentType::Center);
        }
        docx = docx.add_paragraph(caption).add_paragraph(image).add_paragraph(spacer);
    }

    docx
}
