use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use sheetbill_core::DomainError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_sheets(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list_available_sheets().await {
        Ok(sheets) => Json(dto::SheetsResponse { success: true, sheets }).into_response(),
        Err(e) => errors::domain_error_to_response(DomainError::from(e)),
    }
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<dto::CompaniesResponse> {
    Json(dto::CompaniesResponse {
        success: true,
        companies: services.registry.all(),
    })
}

/// Preview one company's billable rows for a sheet.
pub async fn sheet_data(
    Extension(services): Extension<Arc<AppServices>>,
    Path((sheet, company_key)): Path<(String, String)>,
) -> axum::response::Response {
    let Some(company) = services.registry.get_by_key(&company_key) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Company not found");
    };

    let preview = services
        .extractor
        .fetch_company_line_items(&sheet, &company.sheet_identifier)
        .await
        .map_err(DomainError::from)
        .and_then(|items| dto::SheetDataResponse::new(items, Some(company)));
    preview_response(preview)
}

/// Preview every company's billable rows for a sheet.
pub async fn sheet_data_all(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sheet): Path<String>,
) -> axum::response::Response {
    let preview = services
        .extractor
        .fetch_all_line_items(&sheet)
        .await
        .map_err(DomainError::from)
        .and_then(|items| dto::SheetDataResponse::new(items, None));
    preview_response(preview)
}

fn preview_response(
    preview: Result<dto::SheetDataResponse, DomainError>,
) -> axum::response::Response {
    match preview {
        Ok(body) => Json(body).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
