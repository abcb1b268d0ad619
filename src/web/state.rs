//! # Web Application State
//!
//! Shared state handed to every request handler.

use std::sync::Arc;
use std::time::Instant;

use crate::orchestration::ScrapeOrchestrator;

/// Shared state for the metrics HTTP surface
#[derive(Debug, Clone)]
pub struct ExporterWebState {
    /// The single orchestrator that owns the event cache
    pub orchestrator: Arc<ScrapeOrchestrator>,
    started_at: Instant,
}

impl ExporterWebState {
    pub fn new(orchestrator: Arc<ScrapeOrchestrator>) -> Self {
        Self {
            orchestrator,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
