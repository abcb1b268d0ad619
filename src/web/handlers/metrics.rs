//! # Metrics Handler
//!
//! Prometheus scrape endpoint. Each request runs exactly one poll.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error};

use crate::metrics::{content_type, encode_outcome};
use crate::web::state::ExporterWebState;

/// Prometheus metrics endpoint: GET /metrics
///
/// A failed poll is still a `200`: the failure is reported through `up` and
/// `scrape_failures_total`. Only an encoding failure yields a `500`.
pub async fn prometheus_metrics(State(state): State<Arc<ExporterWebState>>) -> Response {
    debug!("Serving Prometheus metrics");

    let outcome = state.orchestrator.poll().await;

    match encode_outcome(&outcome) {
        Ok(body) => ([(header::CONTENT_TYPE, content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to encode metrics: {e}")).into_response()
        }
    }
}
