//! # Health Check Handlers
//!
//! Liveness endpoint for process supervisors. It never touches the database.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::web::state::ExporterWebState;

/// Basic health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub scrape_failures: u64,
}

/// Basic health check endpoint: GET /health
pub async fn basic_health(State(state): State<Arc<ExporterWebState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        scrape_failures: state.orchestrator.scrape_failures(),
    })
}
