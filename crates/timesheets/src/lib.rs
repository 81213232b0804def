//! Monthly time-tracking sheets: discovery and row extraction.
//!
//! This crate only knows the [`SheetSource`] port; the HTTP client for the
//! spreadsheet API lives in `sheetbill-infra`.

pub mod catalog;
pub mod extractor;
pub mod line_item;
pub mod source;

pub use catalog::{select_monthly_sheets, SheetCatalog};
pub use extractor::{normalize_rows, RowFilter, SheetDataExtractor};
pub use line_item::LineItem;
pub use source::{A1Range, InMemorySheetSource, SheetSource, SourceError};
