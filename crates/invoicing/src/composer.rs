use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use sheetbill_companies::{CompanyProfile, CompanyRegistry, RegistryError, RegistryStore};
use sheetbill_core::{DomainError, InvoicePeriod};
use sheetbill_timesheets::LineItem;

use crate::{InvoiceDocument, ManualExpense};

/// Source of invoice numbers, one strictly increasing sequence per company.
pub trait InvoiceNumberIssuer: Send + Sync {
    fn next_invoice_number(&self, company_key: &str) -> Result<u32, RegistryError>;
}

impl<S: RegistryStore> InvoiceNumberIssuer for CompanyRegistry<S> {
    fn next_invoice_number(&self, company_key: &str) -> Result<u32, RegistryError> {
        self.increment_invoice_number(company_key)
    }
}

impl<N> InvoiceNumberIssuer for Arc<N>
where
    N: InvoiceNumberIssuer + ?Sized,
{
    fn next_invoice_number(&self, company_key: &str) -> Result<u32, RegistryError> {
        (**self).next_invoice_number(company_key)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("No data found for this company in the selected month")]
    NoLineItems { company: String, period: InvoicePeriod },

    #[error("Invoice amount out of range")]
    AmountOutOfRange,

    #[error(transparent)]
    Numbering(#[from] RegistryError),
}

impl From<ComposeError> for DomainError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::NoLineItems { .. } => DomainError::not_found(err.to_string()),
            ComposeError::AmountOutOfRange => DomainError::validation(err.to_string()),
            ComposeError::Numbering(e) => e.into(),
        }
    }
}

pub struct InvoiceComposer<N> {
    issuer: N,
}

impl<N: InvoiceNumberIssuer> InvoiceComposer<N> {
    pub fn new(issuer: N) -> Self {
        Self { issuer }
    }

    /// Assemble an invoice and draw its number.
    ///
    /// The number is drawn only after the line items are known to be
    /// non-empty and every total fits in a `Decimal`, so a rejected
    /// composition never consumes a number.
    pub fn compose(
        &self,
        company: &CompanyProfile,
        period: InvoicePeriod,
        line_items: Vec<LineItem>,
        manual_expenses: Vec<ManualExpense>,
        issued_on: NaiveDate,
    ) -> Result<InvoiceDocument, ComposeError> {
        if line_items.is_empty() {
            return Err(ComposeError::NoLineItems {
                company: company.key.clone(),
                period,
            });
        }

        let line_items_total =
            LineItem::total(&line_items).ok_or(ComposeError::AmountOutOfRange)?;
        let manual_expenses_total = manual_expenses
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount))
            .ok_or(ComposeError::AmountOutOfRange)?;
        let total_amount = line_items_total
            .checked_add(manual_expenses_total)
            .ok_or(ComposeError::AmountOutOfRange)?;

        let invoice_number = self.issuer.next_invoice_number(&company.key)?;

        let mut snapshot = company.clone();
        snapshot.latest_invoice_number = invoice_number;

        info!(
            company = %company.key,
            invoice_number,
            period = %period,
            line_items = line_items.len(),
            manual_expenses = manual_expenses.len(),
            total = %total_amount,
            "invoice composed"
        );

        Ok(InvoiceDocument {
            invoice_number,
            invoice_date: issued_on,
            company: snapshot,
            period,
            line_items,
            manual_expenses,
            line_items_total,
            manual_expenses_total,
            total_amount,
        })
    }
}
