//! # Web Module
//!
//! HTTP surface of the exporter: the Prometheus scrape endpoint and a liveness check.

use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ExporterResult;

pub mod handlers;
pub mod state;

pub use state::ExporterWebState;

/// Path Prometheus scrapes
pub const METRICS_PATH: &str = "/metrics";

/// Create the web application with all routes and middleware
pub fn create_app(state: Arc<ExporterWebState>) -> Router {
    Router::new()
        .route(METRICS_PATH, get(handlers::metrics::prometheus_metrics))
        .route("/health", get(handlers::health::basic_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: Arc<ExporterWebState>, addr: SocketAddr) -> ExporterResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(listen_addr = %listener.local_addr()?, path = METRICS_PATH, "Listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
