//! Shared helpers for integration tests.

use async_trait::async_trait;
use std::sync::Mutex;

use airflow_exporter::models::{EventDelta, EventKey, PoolSlot, RunStateCount, Workflow};
use airflow_exporter::{AirflowSource, SourceError, SourceResult};

/// In-memory Airflow database: an append-only log plus static tables.
///
/// `event_deltas` groups the log rows past the requested id exactly like the SQL
/// query does.
#[derive(Default)]
pub struct InMemoryAirflow {
    log: Mutex<Vec<(i64, EventKey)>>,
    pub workflows: Vec<Workflow>,
    pub run_states: Vec<RunStateCount>,
    pub pool_slots: Vec<PoolSlot>,
    down: Mutex<bool>,
}

impl InMemoryAirflow {
    pub fn new() -> Self {
        Self {
            workflows: vec![Workflow {
                workflow_id: "etl".to_string(),
                is_paused: Some(false),
                is_subdag: Some(false),
                is_active: Some(true),
            }],
            run_states: vec![RunStateCount {
                workflow_id: "etl".to_string(),
                state: "success".to_string(),
                count: 10,
            }],
            pool_slots: vec![PoolSlot {
                name: "default_pool".to_string(),
                slots: 128,
            }],
            ..Default::default()
        }
    }

    /// Append `n` log rows for one key, assigning fresh ids.
    pub fn append(&self, workflow: &str, task: &str, event: &str, n: usize) {
        let mut log = self.log.lock().unwrap();
        for _ in 0..n {
            let id = log.last().map(|(id, _)| id + 1).unwrap_or(1);
            log.push((id, EventKey::new(workflow, task, event)));
        }
    }

    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }

    fn check_up(&self) -> SourceResult<()> {
        if *self.down.lock().unwrap() {
            return Err(SourceError::invalid_row("log", "database unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AirflowSource for InMemoryAirflow {
    async fn workflows(&self) -> SourceResult<Vec<Workflow>> {
        self.check_up()?;
        Ok(self.workflows.clone())
    }

    async fn event_deltas(&self, after_id: i64) -> SourceResult<Vec<EventDelta>> {
        self.check_up()?;
        let log = self.log.lock().unwrap();
        let mut grouped: Vec<EventDelta> = Vec::new();
        for (id, key) in log.iter().filter(|(id, _)| *id > after_id) {
            match grouped.iter_mut().find(|d| &d.key == key) {
                Some(delta) => {
                    delta.count += 1;
                    delta.max_id = delta.max_id.max(*id);
                }
                None => grouped.push(EventDelta::new(key.clone(), 1, *id)),
            }
        }
        Ok(grouped)
    }

    async fn run_state_counts(&self) -> SourceResult<Vec<RunStateCount>> {
        self.check_up()?;
        Ok(self.run_states.clone())
    }

    async fn pool_slots(&self) -> SourceResult<Vec<PoolSlot>> {
        self.check_up()?;
        Ok(self.pool_slots.clone())
    }
}
