//! Google Sheets v4 adapter for the spreadsheet port.

mod client;
mod credentials;

pub use client::GoogleSheetsClient;
pub use credentials::{Credentials, ServiceAccountAuth, ServiceAccountKey, SHEETS_READONLY_SCOPE};

use thiserror::Error;

use sheetbill_core::DomainError;

/// The client could not be constructed; reported once at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetsInitError {
    #[error("no spreadsheet credentials: {0}")]
    MissingCredentials(String),

    #[error("invalid service account key: {0}")]
    InvalidServiceAccount(String),

    #[error("invalid sheets base url: {0}")]
    InvalidBaseUrl(String),

    #[error("http client: {0}")]
    Http(String),
}

impl From<SheetsInitError> for DomainError {
    fn from(err: SheetsInitError) -> Self {
        DomainError::upstream(err.to_string())
    }
}
