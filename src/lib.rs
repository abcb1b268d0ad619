#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Airflow Exporter
//!
//! Republishes the state of an Apache Airflow metadata database as Prometheus
//! metrics.
//!
//! ## Overview
//!
//! Every scrape of `/metrics` runs one poll against the database: workflow
//! flags, run-state counts, pool sizes, and the task event log. The event log is
//! append-only and potentially large, so it is read incrementally: an in-memory
//! [`cache::EventCache`] keeps cumulative per-(workflow, task, event) totals and
//! a watermark of the highest log id seen, and each poll only fetches rows past
//! that watermark.
//!
//! ## Module Organization
//!
//! - [`config`] - environment configuration and backend selection
//! - [`database`] - MySQL/PostgreSQL source adapter
//! - [`cache`] - incremental event-count cache
//! - [`orchestration`] - one-poll-per-scrape orchestration and failure counting
//! - [`metrics`] - Prometheus text exposition
//! - [`web`] - HTTP surface
//! - [`models`] - row and domain types
//! - [`error`] - structured error handling
//! - [`logging`] - tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airflow_exporter::config::ConfigLoader;
//! use airflow_exporter::database::{SourcePool, SqlSource};
//! use airflow_exporter::orchestration::ScrapeOrchestrator;
//! use airflow_exporter::web::{self, ExporterWebState};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::from_env()?;
//! let source = SqlSource::new(SourcePool::connect_lazy(&config.database));
//! let orchestrator = Arc::new(ScrapeOrchestrator::new(Arc::new(source)));
//!
//! web::serve(Arc::new(ExporterWebState::new(orchestrator)), config.listen_addr).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestration;
pub mod web;

pub use cache::EventCache;
pub use config::{ConfigLoader, ConfigurationError, DatabaseBackend, ExporterConfig};
pub use database::{AirflowSource, SourcePool, SqlSource};
pub use error::{ExporterError, ExporterResult, SourceError, SourceResult};
pub use orchestration::{PollData, PollOutcome, PollStatus, ScrapeOrchestrator};
