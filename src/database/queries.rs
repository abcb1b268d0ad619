//! Fixed SQL text for each source query, per backend dialect.
//!
//! The two dialects differ in bind placeholders (`?` vs `$1`) and in how integer
//! columns are widened to BIGINT so every backend decodes into `i64`.

use crate::config::DatabaseBackend;

/// The four queries issued on every poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceQuery {
    /// `dag` table: definition flags per workflow
    Workflows,
    /// `log` table: counts past the watermark, grouped by (workflow, task, event)
    EventDeltas,
    /// `dag_run` table: run counts grouped by (workflow, state)
    RunStates,
    /// `slot_pool` table: slot capacity per pool
    PoolSlots,
}

impl SourceQuery {
    pub fn sql(self, backend: DatabaseBackend) -> &'static str {
        match (self, backend) {
            (SourceQuery::Workflows, _) => {
                "SELECT dag_id AS workflow_id, is_paused, is_subdag, is_active FROM dag"
            }
            (SourceQuery::EventDeltas, DatabaseBackend::MySql) => {
                "SELECT COUNT(*) AS event_count, COALESCE(dag_id, '') AS workflow_id, \
                 COALESCE(task_id, '') AS task_id, COALESCE(event, '') AS event, \
                 CAST(MAX(id) AS SIGNED) AS max_id \
                 FROM log WHERE id > ? GROUP BY dag_id, task_id, event"
            }
            (SourceQuery::EventDeltas, DatabaseBackend::Postgres) => {
                "SELECT COUNT(*) AS event_count, COALESCE(dag_id, '') AS workflow_id, \
                 COALESCE(task_id, '') AS task_id, COALESCE(event, '') AS event, \
                 CAST(MAX(id) AS BIGINT) AS max_id \
                 FROM log WHERE id > $1 GROUP BY dag_id, task_id, event"
            }
            (SourceQuery::RunStates, _) => {
                "SELECT COUNT(*) AS run_count, COALESCE(dag_id, '') AS workflow_id, \
                 COALESCE(state, '') AS state \
                 FROM dag_run GROUP BY dag_id, state"
            }
            (SourceQuery::PoolSlots, DatabaseBackend::MySql) => {
                "SELECT COALESCE(pool, '') AS name, CAST(slots AS SIGNED) AS slots FROM slot_pool"
            }
            (SourceQuery::PoolSlots, DatabaseBackend::Postgres) => {
                "SELECT COALESCE(pool, '') AS name, CAST(slots AS BIGINT) AS slots FROM slot_pool"
            }
        }
    }

    /// Short name used in logs and error messages
    pub fn operation(self) -> &'static str {
        match self {
            SourceQuery::Workflows => "workflows",
            SourceQuery::EventDeltas => "event_deltas",
            SourceQuery::RunStates => "run_states",
            SourceQuery::PoolSlots => "pool_slots",
        }
    }
}
