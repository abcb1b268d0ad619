//! Error types for the exporter.

use thiserror::Error;

/// Failures talking to the Airflow database during a poll.
///
/// Connection and query failures collapse into one signal at
/// the metrics surface; the variants only matter for logs.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Invalid row from {table}: {reason}")]
    InvalidRow { table: &'static str, reason: String },
}

impl SourceError {
    pub fn database(operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database { operation, source }
    }

    pub fn invalid_row<R: Into<String>>(table: &'static str, reason: R) -> Self {
        Self::InvalidRow {
            table,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Exposition error: {0}")]
    Exposition(#[from] prometheus::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;
pub type ExporterResult<T> = Result<T, ExporterError>;
