//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Datelike;
use thiserror::Error;
use tracing::warn;

use sheetbill_core::DomainError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SERVICE_ACCOUNT_KEY: &str = "credentials/service-account-key.json";
pub const DEFAULT_COMPANIES_FILE: &str = "data/companies.json";
pub const DEFAULT_LOGO_PATH: &str = "assets/logo.png";
pub const DEFAULT_RENDER_CONCURRENCY: usize = 2;

const DEFAULT_LOGIN_USERNAME: &str = "admin";
const DEFAULT_LOGIN_PASSWORD: &str = "password";
const DEV_SESSION_SECRET: &str = "dev-insecure-session-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Where and how to reach the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub api_key: Option<String>,
    pub service_account_key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub sheets: SheetsConfig,
    pub companies_file: PathBuf,
    pub sheet_year: u16,
    pub logo_path: PathBuf,
    pub render_concurrency: usize,
    pub login: LoginConfig,
    pub session_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut bind_addr = parse_var::<SocketAddr>(
            "BIND_ADDR",
            get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;
        if let Some(port) = get("PORT") {
            bind_addr.set_port(parse_var::<u16>("PORT", port)?);
        }

        let spreadsheet_id =
            get("GOOGLE_SPREADSHEET_ID").ok_or(ConfigError::Missing("GOOGLE_SPREADSHEET_ID"))?;
        let sheets = SheetsConfig {
            base_url: get("GOOGLE_SHEETS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
            spreadsheet_id,
            api_key: get("GOOGLE_API_KEY"),
            service_account_key: get("GOOGLE_SERVICE_ACCOUNT_KEY")
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_KEY.to_string())
                .into(),
        };

        let sheet_year = match get("SHEET_YEAR") {
            Some(raw) => parse_var::<u16>("SHEET_YEAR", raw)?,
            None => current_year(),
        };

        let render_concurrency = match get("RENDER_CONCURRENCY") {
            Some(raw) => {
                let n = parse_var::<usize>("RENDER_CONCURRENCY", raw.clone())?;
                if n == 0 {
                    return Err(ConfigError::Invalid {
                        var: "RENDER_CONCURRENCY",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                n
            }
            None => DEFAULT_RENDER_CONCURRENCY,
        };

        let login = match (get("LOGIN_USERNAME"), get("LOGIN_PASSWORD")) {
            (Some(username), Some(password)) => LoginConfig { username, password },
            (username, password) => {
                warn!("LOGIN_USERNAME/LOGIN_PASSWORD not fully set; using development defaults");
                LoginConfig {
                    username: username.unwrap_or_else(|| DEFAULT_LOGIN_USERNAME.to_string()),
                    password: password.unwrap_or_else(|| DEFAULT_LOGIN_PASSWORD.to_string()),
                }
            }
        };

        let session_secret = get("SESSION_SECRET").unwrap_or_else(|| {
            warn!("SESSION_SECRET not set; using insecure development secret");
            DEV_SESSION_SECRET.to_string()
        });

        Ok(Self {
            bind_addr,
            sheets,
            companies_file: get("COMPANIES_FILE")
                .unwrap_or_else(|| DEFAULT_COMPANIES_FILE.to_string())
                .into(),
            sheet_year,
            logo_path: get("LOGO_PATH").unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string()).into(),
            render_concurrency,
            login,
            session_secret,
        })
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

fn current_year() -> u16 {
    u16::try_from(chrono::Local::now().year()).unwrap_or(u16::MAX)
}
