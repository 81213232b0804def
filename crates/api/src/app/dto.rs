use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sheetbill_companies::{CompanyMap, CompanyProfile};
use sheetbill_core::DomainError;
use sheetbill_invoicing::ManualExpense;
use sheetbill_timesheets::LineItem;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    pub sheet_name: Option<String>,
    pub company_key: Option<String>,
    #[serde(default)]
    pub manual_expenses: Vec<ManualExpense>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SheetsResponse {
    pub success: bool,
    pub sheets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub success: bool,
    pub companies: CompanyMap,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDataResponse {
    pub success: bool,
    pub data: Vec<LineItem>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyProfile>,
}

impl SheetDataResponse {
    pub fn new(data: Vec<LineItem>, company: Option<CompanyProfile>) -> Result<Self, DomainError> {
        let total_amount = LineItem::total(&data)
            .ok_or_else(|| DomainError::validation("Invoice amount out of range"))?;
        Ok(Self {
            success: true,
            data,
            total_amount,
            company,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamProbeResponse {
    pub success: bool,
    pub message: &'static str,
    pub sheet_count: usize,
}
