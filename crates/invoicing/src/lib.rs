//! Invoice composition.
//!
//! Merges extracted line items, manual expenses and a company profile into an
//! immutable [`InvoiceDocument`]. The only side effect is drawing one invoice
//! number from an [`InvoiceNumberIssuer`].

pub mod composer;
pub mod document;

pub use composer::{ComposeError, InvoiceComposer, InvoiceNumberIssuer};
pub use document::{InvoiceDocument, ManualExpense};
