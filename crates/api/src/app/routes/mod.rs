use axum::{
    routing::{get, post},
    Router,
};

pub mod invoices;
pub mod session;
pub mod sheets;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/test-google-api", get(system::test_google_api))
        .route("/api/sheets", get(sheets::list_sheets))
        .route("/api/companies", get(sheets::list_companies))
        .route("/api/sheet-data/:sheet", get(sheets::sheet_data_all))
        .route("/api/sheet-data/:sheet/:company_key", get(sheets::sheet_data))
        .route("/api/generate-invoice", post(invoices::generate_invoice))
}
