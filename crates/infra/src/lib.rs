//! Infrastructure adapters: registry persistence, the Google Sheets client and
//! process configuration.

pub mod config;
pub mod registry_file;
pub mod sheets;

pub use config::{AppConfig, ConfigError, LoginConfig, SheetsConfig};
pub use registry_file::JsonFileStore;
pub use sheets::{Credentials, GoogleSheetsClient, SheetsInitError};
