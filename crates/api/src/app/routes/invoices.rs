use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub async fn generate_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<dto::GenerateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.body_text()),
    };

    tracing::debug!(
        user = session.username(),
        sheet = ?body.sheet_name,
        company = ?body.company_key,
        manual_expenses = body.manual_expenses.len(),
        "generate invoice requested"
    );

    let generated = match services
        .generate_invoice(
            body.sheet_name.as_deref(),
            body.company_key.as_deref(),
            body.manual_expenses,
            Local::now().date_naive(),
        )
        .await
    {
        Ok(g) => g,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", generated.file_name),
            ),
            (header::CONTENT_LENGTH, generated.pdf.len().to_string()),
        ],
        generated.pdf,
    )
        .into_response()
}
