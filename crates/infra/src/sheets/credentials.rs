use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use sheetbill_timesheets::SourceError;

use super::SheetsInitError;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they actually expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a Google service-account key file this client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SheetsInitError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SheetsInitError::MissingCredentials(format!(
                "no GOOGLE_API_KEY set and service account key {} is unreadable: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| SheetsInitError::InvalidServiceAccount(format!("{}: {e}", path.display())))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// OAuth2 JWT-bearer flow for a service account, with a cached access token.
pub struct ServiceAccountAuth {
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Result<Self, SheetsInitError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsInitError::InvalidServiceAccount(format!("private_key: {e}")))?;
        info!(client_email = %key.client_email, "using service account credentials");
        Ok(Self {
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, exchanging a fresh assertion when the cached one
    /// is missing or about to expire.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, SourceError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let assertion = self.sign_assertion()?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::Unreachable(format!("token endpoint: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Unauthorized(format!(
                "token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(format!("token response: {e}")))?;

        let lifetime = Duration::from_secs(token.expires_in);
        let refresh_at = Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN);
        debug!(expires_in = token.expires_in, "obtained service account access token");

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at,
        });
        Ok(token.access_token)
    }

    fn sign_assertion(&self) -> Result<String, SourceError> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_READONLY_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| SourceError::Unauthorized(format!("sign assertion: {e}")))
    }
}

/// How requests to the Sheets API are authorized.
#[derive(Debug)]
pub enum Credentials {
    ApiKey(String),
    ServiceAccount(ServiceAccountAuth),
}

impl Credentials {
    /// API key first; otherwise the service-account key file must exist.
    pub fn resolve(
        api_key: Option<&str>,
        service_account_key: &Path,
    ) -> Result<Self, SheetsInitError> {
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            info!("using API key credentials");
            return Ok(Credentials::ApiKey(key.to_string()));
        }
        let key = ServiceAccountKey::from_file(service_account_key)?;
        Ok(Credentials::ServiceAccount(ServiceAccountAuth::new(key)?))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::ApiKey(_) => "api_key",
            Credentials::ServiceAccount(_) => "service_account",
        }
    }
}
