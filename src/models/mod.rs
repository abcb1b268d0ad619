//! # Domain Models
//!
//! Typed views of the Airflow tables the exporter reads. Rows are decoded by the
//! source adapter and handed to the cache and the stateless aggregations.
//!
//! - [`event`] - append-only `log` table deltas and cumulative totals
//! - [`workflow`] - `dag`, `dag_run` and `slot_pool` snapshots

pub mod event;
pub mod workflow;

pub use event::{EventDelta, EventKey, EventTotal};
pub use workflow::{PoolSlot, RunStateCount, Workflow, DEFAULT_RUN_STATES};
