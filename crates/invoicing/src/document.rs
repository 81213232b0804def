use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sheetbill_companies::CompanyProfile;
use sheetbill_core::InvoicePeriod;
use sheetbill_timesheets::LineItem;

/// A caller-supplied charge that does not come from the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualExpense {
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
}

/// The finalized invoice record.
///
/// Built once by the composer and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub(crate) invoice_number: u32,
    pub(crate) invoice_date: NaiveDate,
    pub(crate) company: CompanyProfile,
    pub(crate) period: InvoicePeriod,
    pub(crate) line_items: Vec<LineItem>,
    pub(crate) manual_expenses: Vec<ManualExpense>,
    pub(crate) line_items_total: Decimal,
    pub(crate) manual_expenses_total: Decimal,
    pub(crate) total_amount: Decimal,
}

impl InvoiceDocument {
    pub fn invoice_number(&self) -> u32 {
        self.invoice_number
    }

    /// Long-form date, e.g. `January 5, 2025`.
    pub fn formatted_invoice_date(&self) -> String {
        self.invoice_date.format("%B %-d, %Y").to_string()
    }

    pub fn company(&self) -> &CompanyProfile {
        &self.company
    }

    pub fn period(&self) -> InvoicePeriod {
        self.period
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn manual_expenses(&self) -> &[ManualExpense] {
        &self.manual_expenses
    }

    pub fn line_items_total(&self) -> Decimal {
        self.line_items_total
    }

    pub fn manual_expenses_total(&self) -> Decimal {
        self.manual_expenses_total
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Download name: `Invoice_<companyKey>_<Month><Year>_<number>.pdf`.
    pub fn file_name(&self) -> String {
        format!(
            "Invoice_{}_{}_{}.pdf",
            self.company.key,
            self.period.compact(),
            self.invoice_number
        )
    }
}
