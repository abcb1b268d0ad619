//! # Airflow Exporter
//!
//! Serves Airflow database state as Prometheus metrics. Configured entirely
//! through `AIRFLOW_PROMETHEUS_*` environment variables.

use std::sync::Arc;

use airflow_exporter::config::ConfigLoader;
use airflow_exporter::database::{SourcePool, SqlSource};
use airflow_exporter::logging::init_structured_logging;
use airflow_exporter::orchestration::ScrapeOrchestrator;
use airflow_exporter::web::{self, ExporterWebState};
use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting airflow-exporter");

    let config = ConfigLoader::from_env().context("invalid exporter configuration")?;

    info!(target_db = %config.database.describe_masked(), "Connecting to Airflow database");
    let pool = SourcePool::connect_lazy(&config.database);
    let source = Arc::new(SqlSource::new(pool.clone()));

    let orchestrator = Arc::new(ScrapeOrchestrator::new(source));
    let state = Arc::new(ExporterWebState::new(orchestrator));

    web::serve(state, config.listen_addr)
        .await
        .with_context(|| format!("failed to serve on {}", config.listen_addr))?;

    pool.close().await;
    info!("airflow-exporter stopped");
    Ok(())
}
