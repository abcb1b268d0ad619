//! # Exporter Configuration
//!
//! Configuration comes entirely from `AIRFLOW_PROMETHEUS_*` environment variables.
//! The raw variables are read through the `config` crate's environment source and
//! then validated into an [`ExporterConfig`]; any problem is a [`ConfigurationError`]
//! and stops the process before the listener is bound.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use airflow_exporter::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::from_env()?;
//!
//! println!("{}", config.database.describe_masked());
//! println!("listening on {}", config.listen_addr);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::Serialize;
use sqlx::postgres::PgSslMode;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Prefix shared by every environment variable the exporter reads
pub const ENV_PREFIX: &str = "AIRFLOW_PROMETHEUS";

/// Placeholder written in place of secrets in anything that gets logged
pub const MASKED_SECRET: &str = "********";

/// SQL dialect of the Airflow metadata database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    MySql,
    Postgres,
}

impl DatabaseBackend {
    pub fn default_port(self) -> u16 {
        match self {
            DatabaseBackend::MySql => 3306,
            DatabaseBackend::Postgres => 5432,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseBackend::MySql => "mysql",
            DatabaseBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(DatabaseBackend::MySql),
            "postgres" => Ok(DatabaseBackend::Postgres),
            other => Err(ConfigurationError::unknown_backend(other)),
        }
    }
}

/// TLS options, only honoured by the PostgreSQL backend
#[derive(Debug, Clone)]
pub struct PostgresTlsConfig {
    pub ssl_mode: PgSslMode,
    /// Raw mode string as configured, kept for logging
    pub ssl_mode_name: String,
    pub ssl_cert: Option<PathBuf>,
    pub ssl_key: Option<PathBuf>,
    pub ssl_root_cert: Option<PathBuf>,
}

impl Default for PostgresTlsConfig {
    fn default() -> Self {
        Self {
            ssl_mode: PgSslMode::Disable,
            ssl_mode_name: "disable".to_string(),
            ssl_cert: None,
            ssl_key: None,
            ssl_root_cert: None,
        }
    }
}

/// Connection parameters for the Airflow metadata database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub postgres_tls: PostgresTlsConfig,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Human-readable connection target with the password masked.
    pub fn describe_masked(&self) -> String {
        match self.backend {
            DatabaseBackend::MySql => format!(
                "mysql://{}:{}@({}:{})/{}",
                self.user, MASKED_SECRET, self.host, self.port, self.name
            ),
            DatabaseBackend::Postgres => {
                let mut properties = vec![
                    format!("host={}", self.host),
                    format!("port={}", self.port),
                    format!("user={}", self.user),
                ];
                if !self.password.is_empty() {
                    properties.push(format!("password={MASKED_SECRET}"));
                }
                properties.push(format!("dbname={}", self.name));
                properties.push(format!("sslmode={}", self.postgres_tls.ssl_mode_name));

                let paths = [
                    ("sslcert", &self.postgres_tls.ssl_cert),
                    ("sslkey", &self.postgres_tls.ssl_key),
                    ("sslrootcert", &self.postgres_tls.ssl_root_cert),
                ];
                for (key, path) in paths {
                    if let Some(path) = path {
                        properties.push(format!("{key}={}", path.display()));
                    }
                }

                format!("postgres://{}", properties.join(" "))
            }
        }
    }
}

/// Fully validated exporter configuration
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub database: DatabaseConfig,
    pub listen_addr: SocketAddr,
}
