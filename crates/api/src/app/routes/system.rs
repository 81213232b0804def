use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use tracing::info;

use sheetbill_core::DomainError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn health() -> Json<dto::HealthResponse> {
    Json(dto::HealthResponse {
        success: true,
        message: "Invoice System is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Probe the spreadsheet with the configured credentials.
pub async fn test_google_api(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.source().sheet_titles().await {
        Ok(titles) => {
            info!(sheets = titles.len(), "spreadsheet connection check succeeded");
            Json(dto::UpstreamProbeResponse {
                success: true,
                message: "Google API connection successful",
                sheet_count: titles.len(),
            })
            .into_response()
        }
        Err(e) => errors::domain_error_to_response(DomainError::from(e)),
    }
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Endpoint not found")
}
