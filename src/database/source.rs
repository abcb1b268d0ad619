//! # Source Adapter
//!
//! The [`AirflowSource`] trait is the seam between the poll orchestrator and the
//! Airflow database. [`SqlSource`] is the production implementation; tests plug
//! in in-memory sources.
//!
//! ## Precondition
//!
//! `event_deltas` relies on the `log` table being append-only with ids that are
//! assigned once and never reused. Querying `id > watermark` then never returns
//! a row twice. Nothing here checks that; compaction or id recycling on the
//! Airflow side would make the exporter undercount silently.

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::debug;

use super::connection::SourcePool;
use super::queries::SourceQuery;
use crate::error::{SourceError, SourceResult};
use crate::models::{EventDelta, EventKey, PoolSlot, RunStateCount, Workflow};

/// Read-only access to the Airflow tables the exporter reports on
#[async_trait]
pub trait AirflowSource: Send + Sync {
    async fn workflows(&self) -> SourceResult<Vec<Workflow>>;

    /// Log rows with `id > after_id`, grouped by (workflow, task, event).
    async fn event_deltas(&self, after_id: i64) -> SourceResult<Vec<EventDelta>>;

    /// Raw grouped run counts; zero-filling of default states happens downstream.
    async fn run_state_counts(&self) -> SourceResult<Vec<RunStateCount>>;

    async fn pool_slots(&self) -> SourceResult<Vec<PoolSlot>>;
}

#[derive(Debug, FromRow)]
struct EventDeltaRow {
    event_count: i64,
    workflow_id: String,
    task_id: String,
    event: String,
    max_id: i64,
}

impl TryFrom<EventDeltaRow> for EventDelta {
    type Error = SourceError;

    fn try_from(row: EventDeltaRow) -> Result<Self, Self::Error> {
        let count = u64::try_from(row.event_count).map_err(|_| {
            SourceError::invalid_row("log", format!("negative count {}", row.event_count))
        })?;

        Ok(EventDelta::new(
            EventKey::new(row.workflow_id, row.task_id, row.event),
            count,
            row.max_id,
        ))
    }
}

#[derive(Debug, FromRow)]
struct RunStateRow {
    run_count: i64,
    workflow_id: String,
    state: String,
}

impl TryFrom<RunStateRow> for RunStateCount {
    type Error = SourceError;

    fn try_from(row: RunStateRow) -> Result<Self, Self::Error> {
        let count = u64::try_from(row.run_count).map_err(|_| {
            SourceError::invalid_row("dag_run", format!("negative count {}", row.run_count))
        })?;

        Ok(RunStateCount {
            workflow_id: row.workflow_id,
            state: row.state,
            count,
        })
    }
}

/// [`AirflowSource`] backed by a MySQL or PostgreSQL pool
#[derive(Debug, Clone)]
pub struct SqlSource {
    pool: SourcePool,
}

impl SqlSource {
    pub fn new(pool: SourcePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SourcePool {
        &self.pool
    }

    async fn fetch<O>(&self, query: SourceQuery, after_id: Option<i64>) -> SourceResult<Vec<O>>
    where
        O: for<'r> FromRow<'r, sqlx::mysql::MySqlRow>
            + for<'r> FromRow<'r, sqlx::postgres::PgRow>
            + Send
            + Unpin,
    {
        let rows = self
            .pool
            .fetch_all::<O>(query, after_id)
            .await
            .map_err(|e| SourceError::database(query.operation(), e))?;

        debug!(
            operation = query.operation(),
            backend = %self.pool.backend(),
            rows = rows.len(),
            "Source query completed"
        );

        Ok(rows)
    }
}

#[async_trait]
impl AirflowSource for SqlSource {
    async fn workflows(&self) -> SourceResult<Vec<Workflow>> {
        self.fetch::<Workflow>(SourceQuery::Workflows, None).await
    }

    async fn event_deltas(&self, after_id: i64) -> SourceResult<Vec<EventDelta>> {
        self.fetch::<EventDeltaRow>(SourceQuery::EventDeltas, Some(after_id))
            .await?
            .into_iter()
            .map(EventDelta::try_from)
            .collect()
    }

    async fn run_state_counts(&self) -> SourceResult<Vec<RunStateCount>> {
        self.fetch::<RunStateRow>(SourceQuery::RunStates, None)
            .await?
            .into_iter()
            .map(RunStateCount::try_from)
            .collect()
    }

    async fn pool_slots(&self) -> SourceResult<Vec<PoolSlot>> {
        self.fetch::<PoolSlot>(SourceQuery::PoolSlots, None).await
    }
}
