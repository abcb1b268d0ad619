//! Metric descriptors: names, help strings and label sets.

use prometheus::{Gauge, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};

use crate::orchestration::PollData;

/// Prefix applied to every metric name
pub const METRICS_NAMESPACE: &str = "airflow";

pub const WORKFLOW_LABEL: &str = "workflow";
pub const TASK_LABEL: &str = "task";
pub const EVENT_LABEL: &str = "event";
pub const STATE_LABEL: &str = "state";
pub const POOL_LABEL: &str = "name";

/// The data-bearing metrics, only registered for a successful poll
#[derive(Clone)]
pub struct ExporterMetrics {
    pub workflow_active: IntGaugeVec,
    pub workflow_paused: IntGaugeVec,
    pub event_total: IntCounterVec,
    pub workflow_run_state: IntGaugeVec,
    pub pool_slots: IntGaugeVec,
}

impl ExporterMetrics {
    pub fn up() -> prometheus::Result<Gauge> {
        Gauge::with_opts(Opts::new("up", "able to contact airflow database"))
    }

    pub fn scrape_failures() -> prometheus::Result<IntCounter> {
        IntCounter::with_opts(Opts::new(
            "scrape_failures_total",
            "Number of errors while scraping airflow database",
        ))
    }

    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            workflow_active: IntGaugeVec::new(
                Opts::new("workflow_active", "Is the workflow active?"),
                &[WORKFLOW_LABEL],
            )?,
            workflow_paused: IntGaugeVec::new(
                Opts::new("workflow_paused", "Is the workflow paused?"),
                &[WORKFLOW_LABEL],
            )?,
            event_total: IntCounterVec::new(
                Opts::new("event_total", "Total events per workflow, task and event type"),
                &[WORKFLOW_LABEL, TASK_LABEL, EVENT_LABEL],
            )?,
            workflow_run_state: IntGaugeVec::new(
                Opts::new("workflow_run_state", "Number of workflow runs per workflow and state"),
                &[WORKFLOW_LABEL, STATE_LABEL],
            )?,
            pool_slots: IntGaugeVec::new(
                Opts::new("pool_slots", "Pool name with slot size"),
                &[POOL_LABEL],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.workflow_active.clone()))?;
        registry.register(Box::new(self.workflow_paused.clone()))?;
        registry.register(Box::new(self.event_total.clone()))?;
        registry.register(Box::new(self.workflow_run_state.clone()))?;
        registry.register(Box::new(self.pool_slots.clone()))?;
        Ok(())
    }

    pub fn observe(&self, data: &PollData) {
        for workflow in &data.workflows {
            let labels = [workflow.workflow_id.as_str()];
            self.workflow_active
                .with_label_values(&labels)
                .set(i64::from(workflow.active()));
            self.workflow_paused
                .with_label_values(&labels)
                .set(i64::from(workflow.paused()));
        }

        for total in &data.event_totals {
            self.event_total
                .with_label_values(&[
                    total.key.workflow_id.as_str(),
                    total.key.task_id.as_str(),
                    total.key.event.as_str(),
                ])
                .inc_by(total.count);
        }

        for run_state in &data.run_states {
            self.workflow_run_state
                .with_label_values(&[run_state.workflow_id.as_str(), run_state.state.as_str()])
                .set(saturating_i64(run_state.count));
        }

        for pool in &data.pool_slots {
            self.pool_slots
                .with_label_values(&[pool.name.as_str()])
                .set(pool.slots);
        }
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
