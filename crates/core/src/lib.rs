//! `sheetbill-core`: domain foundation shared by every other crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy, billing periods derived from sheet names, and the
//! decimal amount handling used for spreadsheet cells and rendered totals.

pub mod error;
pub mod money;
pub mod period;

pub use error::{DomainError, DomainResult};
pub use money::{format_currency, format_fixed, parse_amount, AmountParseError};
pub use period::{InvoicePeriod, Month, PeriodParseError};
