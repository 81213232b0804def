//! Invoice layout model: formatted table rows and their page split.
//!
//! All measurements are millimetres on an A4 page with 0.5in margins; the
//! origin is bottom-left, as in PDF.

use sheetbill_core::{format_currency, format_fixed};
use sheetbill_invoicing::InvoiceDocument;

pub const PAGE_W: f32 = 210.0;
pub const PAGE_H: f32 = 297.0;
pub const MARGIN: f32 = 12.7;

pub const CONTENT_LEFT: f32 = MARGIN;
pub const CONTENT_RIGHT: f32 = PAGE_W - MARGIN;
pub const CONTENT_TOP: f32 = PAGE_H - MARGIN;

pub const HEADER_BLOCK_H: f32 = 34.0;
pub const BILLING_BLOCK_H: f32 = 30.0;
pub const PROJECT_LINE_H: f32 = 10.0;
pub const CONTINUATION_H: f32 = 10.0;

pub const ROW_H: f32 = 8.0;
pub const NOTES_BLOCK_H: f32 = 16.0;
pub const FOOTER_H: f32 = 16.0;

/// Lowest y a table row may occupy.
pub const TABLE_BOTTOM: f32 = MARGIN + FOOTER_H;

/// Top of the table (column header row) on the first page.
pub const FIRST_TABLE_TOP: f32 = CONTENT_TOP - HEADER_BLOCK_H - BILLING_BLOCK_H - PROJECT_LINE_H;

/// Top of the table on continuation pages.
pub const NEXT_TABLE_TOP: f32 = CONTENT_TOP - CONTINUATION_H;

/// Fixed payee identity printed on every invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payee {
    pub name: &'static str,
    pub street: &'static str,
    pub city: &'static str,
}

pub const PAYEE: Payee = Payee {
    name: "PAF TESTING CORP",
    street: "255 RIVERTOWN SHOPS DR STE 102-204",
    city: "ST JOHNS, FL 32259",
};

pub const NOTES_TITLE: &str = "Notes:";
pub const PAYMENT_TERMS: &str = "Payment is due within 30 days of invoice date.";
pub const THANK_YOU: &str = "Thank you for your business!";
pub const EXPENSES_HEADER: &str = "Additional Expenses";
pub const TOTAL_LABEL: &str = "Total Amount";
pub const PLACEHOLDER: &str = "-";

/// One row of the itemized table, already formatted for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Item {
        description: String,
        hours: String,
        rate: String,
        amount: String,
    },
    SectionHeader(String),
    Expense {
        description: String,
        amount: String,
    },
    Total {
        label: String,
        amount: String,
    },
}

impl TableRow {
    /// Text for the Description/Hours/Rate/Amount columns.
    pub fn cells(&self) -> [&str; 4] {
        match self {
            TableRow::Item {
                description,
                hours,
                rate,
                amount,
            } => [description, hours, rate, amount],
            TableRow::SectionHeader(label) => [label, "", "", ""],
            TableRow::Expense {
                description,
                amount,
            } => [description, PLACEHOLDER, PLACEHOLDER, amount],
            TableRow::Total { label, amount } => [label, "", "", amount],
        }
    }
}

/// Table body rows: items, then (when present) an expenses section, then the total.
pub fn table_rows(doc: &InvoiceDocument) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = doc
        .line_items()
        .iter()
        .map(|item| TableRow::Item {
            description: item.consultant_name.clone(),
            hours: format_fixed(item.actual_hours),
            rate: format_currency(item.client_rate),
            amount: format_currency(item.amount_to_invoice),
        })
        .collect();

    if !doc.manual_expenses().is_empty() {
        rows.push(TableRow::SectionHeader(EXPENSES_HEADER.to_string()));
        rows.extend(doc.manual_expenses().iter().map(|e| TableRow::Expense {
            description: e.description.clone(),
            amount: format_currency(e.amount),
        }));
    }

    rows.push(TableRow::Total {
        label: TOTAL_LABEL.to_string(),
        amount: format_currency(doc.total_amount()),
    });
    rows
}

/// Body rows that fit below the column header row starting at `table_top`.
pub fn rows_per_page(table_top: f32) -> usize {
    let usable = table_top - ROW_H - TABLE_BOTTOM;
    (usable / ROW_H).floor().max(1.0) as usize
}

/// Split rows into pages: the first page holds fewer rows (it also carries the
/// header and billing blocks). Always returns at least one page.
pub fn paginate(rows: &[TableRow]) -> Vec<&[TableRow]> {
    let first = rows_per_page(FIRST_TABLE_TOP);
    let next = rows_per_page(NEXT_TABLE_TOP);

    let mut pages = Vec::new();
    let (head, mut rest) = rows.split_at(rows.len().min(first));
    pages.push(head);
    while !rest.is_empty() {
        let (page, tail) = rest.split_at(rest.len().min(next));
        pages.push(page);
        rest = tail;
    }
    pages
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`.
pub fn fit_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Approximate rendered width of `text` in Helvetica, in millimetres.
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 25.4 / 72.0;
    let units: u32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' | '$' => 556,
            '.' | ',' | ' ' | ':' => 278,
            '-' => 333,
            '#' => 556,
            'A'..='Z' => 667,
            'a'..='z' => 500,
            _ => 556,
        })
        .sum();
    units as f32 / 1000.0 * font_size_pt * PT_TO_MM
}
