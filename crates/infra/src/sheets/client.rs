use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use sheetbill_timesheets::{A1Range, SheetSource, SourceError};

use super::{Credentials, SheetsInitError};
use crate::config::SheetsConfig;

/// Google Sheets v4 REST client implementing [`SheetSource`].
#[derive(Debug)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GoogleSheetsClient {
    /// Resolve credentials and prepare the HTTP client. Nothing is fetched yet.
    pub fn connect(config: &SheetsConfig) -> Result<Self, SheetsInitError> {
        let credentials =
            Credentials::resolve(config.api_key.as_deref(), &config.service_account_key)?;
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(
        config: &SheetsConfig,
        credentials: Credentials,
    ) -> Result<Self, SheetsInitError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SheetsInitError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsInitError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("sheetbill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SheetsInitError::Http(e.to_string()))?;

        debug!(
            base_url = %base_url,
            spreadsheet_id = %config.spreadsheet_id,
            credentials = credentials.mode(),
            "sheets client ready"
        );
        Ok(Self {
            http,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            credentials,
        })
    }

    fn endpoint(&self, extra: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["spreadsheets", self.spreadsheet_id.as_str()])
                .extend(extra);
        }
        url
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, SourceError> {
        match &self.credentials {
            Credentials::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            Credentials::ServiceAccount(auth) => {
                let token = auth.access_token(&self.http).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    async fn get_json<T>(&self, url: Url, query: &[(&str, &str)]) -> Result<T, SourceError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self.authorize(self.http.get(url.clone()).query(query)).await?;
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unreachable(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(format!("{}: {e}", url.path())))
    }
}

async fn check_status(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    warn!(status = status.as_u16(), %message, "sheets api request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized(message),
        _ => SourceError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Cells arrive as formatted strings; numbers and booleans are stringified.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn sheet_titles(&self) -> Result<Vec<String>, SourceError> {
        let meta: SpreadsheetMeta = self
            .get_json(self.endpoint(&[]), &[("fields", "sheets.properties.title")])
            .await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn values(&self, range: &A1Range) -> Result<Vec<Vec<String>>, SourceError> {
        let a1 = range.to_string();
        let body: ValueRange = self.get_json(self.endpoint(&["values", a1.as_str()]), &[]).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}
