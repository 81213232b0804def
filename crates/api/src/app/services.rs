//! Service wiring shared by all handlers.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};

use sheetbill_auth::{LoginCredentials, SessionTokens};
use sheetbill_companies::{CompanyRegistry, PersistenceError, RegistryStore};
use sheetbill_core::{DomainError, InvoicePeriod};
use sheetbill_infra::{AppConfig, GoogleSheetsClient, JsonFileStore, SheetsInitError};
use sheetbill_invoicing::{InvoiceComposer, ManualExpense};
use sheetbill_render::{load_logo, DocumentRenderer, RenderPool};
use sheetbill_timesheets::{SheetCatalog, SheetDataExtractor, SheetSource};

pub type Registry = CompanyRegistry<Arc<dyn RegistryStore>>;
pub type Source = Arc<dyn SheetSource>;

/// Everything needed to build [`AppServices`] apart from the two external ports.
pub struct ServiceOptions {
    pub sheet_year: u16,
    pub render_concurrency: usize,
    pub renderer: DocumentRenderer,
    pub login: LoginCredentials,
    pub session_secret: String,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("company registry: {0}")]
    Registry(#[from] PersistenceError),

    #[error("spreadsheet client: {0}")]
    Sheets(#[from] SheetsInitError),
}

pub struct AppServices {
    pub registry: Arc<Registry>,
    pub catalog: SheetCatalog<Source>,
    pub extractor: SheetDataExtractor<Source>,
    pub composer: Arc<InvoiceComposer<Arc<Registry>>>,
    pub renderer: RenderPool<DocumentRenderer>,
    pub login: LoginCredentials,
    pub tokens: Arc<SessionTokens>,
    source: Source,
}

/// A rendered invoice ready to be sent.
#[derive(Debug, Clone)]
pub struct GeneratedInvoice {
    pub file_name: String,
    pub invoice_number: u32,
    pub pdf: Vec<u8>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn RegistryStore>,
        source: Source,
        options: ServiceOptions,
    ) -> Result<Self, StartupError> {
        let registry = Arc::new(CompanyRegistry::open(store)?);
        Ok(Self {
            composer: Arc::new(InvoiceComposer::new(registry.clone())),
            registry,
            catalog: SheetCatalog::new(source.clone(), options.sheet_year),
            extractor: SheetDataExtractor::new(source.clone()),
            renderer: RenderPool::new(options.renderer, options.render_concurrency),
            login: options.login,
            tokens: Arc::new(SessionTokens::new(&options.session_secret)),
            source,
        })
    }

    /// Production wiring: file-backed registry, Google Sheets, logo from disk.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn RegistryStore> = Arc::new(JsonFileStore::new(&config.companies_file));
        let source: Source = Arc::new(GoogleSheetsClient::connect(&config.sheets)?);
        let renderer = DocumentRenderer::new(load_logo(&config.logo_path));

        Self::new(
            store,
            source,
            ServiceOptions {
                sheet_year: config.sheet_year,
                render_concurrency: config.render_concurrency,
                renderer,
                login: LoginCredentials::new(&config.login.username, &config.login.password),
                session_secret: config.session_secret.clone(),
            },
        )
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The full generate flow. The invoice number is drawn only once every
    /// check has passed and the company has rows for the period.
    pub async fn generate_invoice(
        &self,
        sheet_name: Option<&str>,
        company_key: Option<&str>,
        manual_expenses: Vec<ManualExpense>,
        issued_on: NaiveDate,
    ) -> Result<GeneratedInvoice, DomainError> {
        let (sheet_name, company_key) = match (non_empty(sheet_name), non_empty(company_key)) {
            (Some(sheet), Some(key)) => (sheet, key),
            _ => return Err(DomainError::validation("Sheet name and company key are required")),
        };

        let company = self
            .registry
            .get_by_key(company_key)
            .ok_or_else(|| DomainError::validation("Company not found"))?;

        let period = InvoicePeriod::parse(sheet_name)?;

        let line_items = self
            .extractor
            .fetch_company_line_items(sheet_name, &company.sheet_identifier)
            .await?;

        // Drawing a number syncs the registry file to disk; keep it off the
        // async workers.
        let composer = Arc::clone(&self.composer);
        let profile = company.clone();
        let document = tokio::task::spawn_blocking(move || {
            composer.compose(&profile, period, line_items, manual_expenses, issued_on)
        })
        .await
        .map_err(|e| {
            error!(company = %company.key, error = %e, "invoice composition task failed");
            DomainError::upstream("Invoice composition failed")
        })??;

        let file_name = document.file_name();
        let invoice_number = document.invoice_number();
        let total = document.total_amount();

        let pdf = self.renderer.render(document).await.map_err(|e| {
            error!(
                company = %company.key,
                invoice_number,
                error = %e,
                "render failed after invoice number was issued"
            );
            DomainError::from(e)
        })?;

        info!(
            file_name = %file_name,
            company = %company.legal_name,
            total = %total.round_dp(2),
            bytes = pdf.len(),
            "invoice generated"
        );

        Ok(GeneratedInvoice {
            file_name,
            invoice_number,
            pdf,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
