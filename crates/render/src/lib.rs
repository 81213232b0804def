//! PDF rendering of finalized invoices.
//!
//! Rendering is split in two: [`layout`] turns an [`InvoiceDocument`] into
//! formatted rows and pages (pure, deterministic), and [`pdf`] paints that
//! layout onto an A4 document. [`RenderPool`] bounds how many renders run at
//! once.
//!
//! [`InvoiceDocument`]: sheetbill_invoicing::InvoiceDocument

pub mod layout;
pub mod pdf;
pub mod pool;

pub use layout::{paginate, table_rows, Payee, TableRow, PAYEE};
pub use pdf::{load_logo, DocumentRenderer, InvoiceRenderer, RenderError};
pub use pool::{RenderLease, RenderPool};
