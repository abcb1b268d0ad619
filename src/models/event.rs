use serde::{Deserialize, Serialize};
use std::fmt;

/// Accumulation bucket for the `log` table: one per (workflow, task, event) triple.
///
/// Ordering is lexicographic over the three fields so cache snapshots come out
/// in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub workflow_id: String,
    pub task_id: String,
    pub event: String,
}

impl EventKey {
    pub fn new(
        workflow_id: impl Into<String>,
        task_id: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            task_id: task_id.into(),
            event: event.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.workflow_id, self.task_id, self.event)
    }
}

/// Log rows newer than the watermark, pre-aggregated by key within one batch.
///
/// `max_id` is the highest `log.id` that contributed to `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDelta {
    pub key: EventKey,
    pub count: u64,
    pub max_id: i64,
}

impl EventDelta {
    pub fn new(key: EventKey, count: u64, max_id: i64) -> Self {
        Self { key, count, max_id }
    }
}

/// Cumulative count for one key since process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTotal {
    pub key: EventKey,
    pub count: u64,
}
