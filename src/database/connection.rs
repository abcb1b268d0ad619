use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::FromRow;
use tracing::info;

use super::queries::SourceQuery;
use crate::config::{DatabaseBackend, DatabaseConfig};

/// Connection pool for whichever backend was configured
#[derive(Debug, Clone)]
pub enum SourcePool {
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl SourcePool {
    /// Build the pool without connecting. The first poll opens the first connection,
    /// so an unreachable database surfaces as a failed scrape rather than a startup error.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        info!(
            backend = %config.backend,
            db_target = %config.describe_masked(),
            max_connections = config.max_connections,
            "Configuring database pool"
        );

        match config.backend {
            DatabaseBackend::MySql => {
                let options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.name);

                let pool = MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(options);

                SourcePool::MySql(pool)
            }
            DatabaseBackend::Postgres => {
                let tls = &config.postgres_tls;
                let mut options = PgConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.name)
                    .ssl_mode(tls.ssl_mode);

                if let Some(path) = &tls.ssl_root_cert {
                    options = options.ssl_root_cert(path);
                }
                if let Some(path) = &tls.ssl_cert {
                    options = options.ssl_client_cert(path);
                }
                if let Some(path) = &tls.ssl_key {
                    options = options.ssl_client_key(path);
                }

                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(options);

                SourcePool::Postgres(pool)
            }
        }
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            SourcePool::MySql(_) => DatabaseBackend::MySql,
            SourcePool::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    /// Run one of the fixed queries, binding `after_id` when given.
    pub async fn fetch_all<O>(&self, query: SourceQuery, after_id: Option<i64>) -> Result<Vec<O>, sqlx::Error>
    where
        O: for<'r> FromRow<'r, MySqlRow> + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = query.sql(self.backend());

        match self {
            SourcePool::MySql(pool) => {
                let mut statement = sqlx::query_as::<sqlx::MySql, O>(sql);
                if let Some(id) = after_id {
                    statement = statement.bind(id);
                }
                statement.fetch_all(pool).await
            }
            SourcePool::Postgres(pool) => {
                let mut statement = sqlx::query_as::<sqlx::Postgres, O>(sql);
                if let Some(id) = after_id {
                    statement = statement.bind(id);
                }
                statement.fetch_all(pool).await
            }
        }
    }

    pub async fn close(&self) {
        match self {
            SourcePool::MySql(pool) => pool.close().await,
            SourcePool::Postgres(pool) => pool.close().await,
        }
    }
}
