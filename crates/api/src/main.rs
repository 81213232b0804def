use std::sync::Arc;

use anyhow::Context;

use sheetbill_api::app::{build_app, AppServices};
use sheetbill_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sheetbill_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config).context("failed to initialize services")?;

    tracing::info!(
        companies = services.registry.all().len(),
        sheet_year = config.sheet_year,
        render_concurrency = config.render_concurrency,
        "services ready"
    );

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
