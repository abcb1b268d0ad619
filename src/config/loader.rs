//! Configuration Loader
//!
//! Reads `AIRFLOW_PROMETHEUS_*` variables through the `config` crate, applies
//! backend-aware defaults and validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::{DatabaseBackend, DatabaseConfig, ExporterConfig, PostgresTlsConfig, ENV_PREFIX};
use serde::Deserialize;
use sqlx::postgres::PgSslMode;
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const DEFAULT_LISTEN_ADDR: &str = ":9112";
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 10;

/// Variables as they appear in the environment, keys lowercased with the prefix
/// stripped (`AIRFLOW_PROMETHEUS_DATABASE_HOST` -> `database_host`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEnvConfig {
    database_backend: Option<String>,
    database_host: Option<String>,
    database_port: Option<String>,
    database_user: Option<String>,
    database_password: Option<String>,
    database_name: Option<String>,
    postgres_ssl_mode: Option<String>,
    postgres_ssl_cert: Option<String>,
    postgres_ssl_key: Option<String>,
    postgres_ssl_root_cert: Option<String>,
    listen_addr: Option<String>,
    max_connections: Option<String>,
    acquire_timeout_seconds: Option<String>,
}

/// Builds an [`ExporterConfig`] from environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<ExporterConfig> {
        Self::load(None)
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment. Keys are full variable names, e.g. `AIRFLOW_PROMETHEUS_DATABASE_HOST`.
    /// This is useful for testing without modifying global environment variables.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<ExporterConfig>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> ConfigResult<ExporterConfig> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .source(vars.map(|vars| vars.into_iter().collect()));

        let raw: RawEnvConfig = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        let config = Self::validate(raw)?;

        debug!(
            backend = %config.database.backend,
            db_target = %config.database.describe_masked(),
            listen_addr = %config.listen_addr,
            max_connections = config.database.max_connections,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn validate(raw: RawEnvConfig) -> ConfigResult<ExporterConfig> {
        let backend = DatabaseBackend::from_str(raw.database_backend.as_deref().unwrap_or("mysql"))?;

        let port = match non_empty(raw.database_port) {
            Some(port) => port.parse::<u16>().map_err(|e| {
                ConfigurationError::invalid_value("database_port", port.clone(), e.to_string())
            })?,
            None => backend.default_port(),
        };

        let postgres_tls = match backend {
            DatabaseBackend::Postgres => {
                let ssl_mode_name = non_empty(raw.postgres_ssl_mode).unwrap_or_else(|| "disable".to_string());
                let ssl_mode = PgSslMode::from_str(&ssl_mode_name).map_err(|e| {
                    ConfigurationError::invalid_value("postgres_ssl_mode", ssl_mode_name.clone(), e.to_string())
                })?;
                PostgresTlsConfig {
                    ssl_mode,
                    ssl_mode_name,
                    ssl_cert: non_empty(raw.postgres_ssl_cert).map(PathBuf::from),
                    ssl_key: non_empty(raw.postgres_ssl_key).map(PathBuf::from),
                    ssl_root_cert: non_empty(raw.postgres_ssl_root_cert).map(PathBuf::from),
                }
            }
            DatabaseBackend::MySql => PostgresTlsConfig::default(),
        };

        let max_connections = match non_empty(raw.max_connections) {
            Some(value) => match value.parse::<u32>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => {
                    return Err(ConfigurationError::invalid_value(
                        "max_connections",
                        value,
                        "must be a positive integer",
                    ))
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let acquire_timeout_seconds = match non_empty(raw.acquire_timeout_seconds) {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ConfigurationError::invalid_value("acquire_timeout_seconds", value.clone(), e.to_string())
            })?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
        };

        let listen_addr = resolve_listen_addr(
            raw.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR),
        )?;

        Ok(ExporterConfig {
            database: DatabaseConfig {
                backend,
                host: raw.database_host.unwrap_or_else(|| "localhost".to_string()),
                port,
                user: raw.database_user.unwrap_or_else(|| "airflow".to_string()),
                password: raw.database_password.unwrap_or_else(|| "airflow".to_string()),
                name: raw.database_name.unwrap_or_else(|| "airflow".to_string()),
                postgres_tls,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_seconds),
            },
            listen_addr,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolve a listen address. A bare `:port` binds every interface.
pub fn resolve_listen_addr(address: &str) -> ConfigResult<SocketAddr> {
    let candidate = if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    };

    candidate
        .to_socket_addrs()
        .map_err(|e| ConfigurationError::invalid_listen_address(address, e))?
        .next()
        .ok_or_else(|| ConfigurationError::invalid_listen_address(address, "resolved to no addresses"))
}
