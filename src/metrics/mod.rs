//! # Prometheus Exposition
//!
//! Turns a [`PollOutcome`] into the Prometheus text format.
//!
//! ## Metrics
//!
//! Every name carries the `airflow_` namespace.
//!
//! | Metric | Type | Labels |
//! |---|---|---|
//! | `up` | gauge | |
//! | `scrape_failures_total` | counter | |
//! | `event_total` | counter | `workflow`, `task`, `event` |
//! | `workflow_active` | gauge | `workflow` |
//! | `workflow_paused` | gauge | `workflow` |
//! | `workflow_run_state` | gauge | `workflow`, `state` |
//! | `pool_slots` | gauge | `name` |
//!
//! A failed poll only reports `up` and `scrape_failures_total`; nothing stale or
//! partial is emitted alongside them.
//!
//! ## Usage
//!
//! ```rust
//! use airflow_exporter::metrics::encode_outcome;
//! use airflow_exporter::orchestration::{PollOutcome, PollStatus};
//!
//! let outcome = PollOutcome { status: PollStatus::Down, scrape_failures: 3 };
//! let text = encode_outcome(&outcome).unwrap();
//!
//! assert!(text.contains("airflow_up 0"));
//! assert!(text.contains("airflow_scrape_failures_total 3"));
//! ```

pub mod descriptors;

use prometheus::{Encoder, Registry, TextEncoder};

use crate::error::{ExporterError, ExporterResult};
use crate::orchestration::{PollOutcome, PollStatus};
use descriptors::{ExporterMetrics, METRICS_NAMESPACE};

/// Content type of [`encode_outcome`]'s output
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Build a fresh registry for this outcome and render it.
///
/// A registry per scrape keeps every reported series tied to the current poll:
/// a workflow that disappears from the database disappears from the output.
pub fn encode_outcome(outcome: &PollOutcome) -> ExporterResult<String> {
    let registry = Registry::new_custom(Some(METRICS_NAMESPACE.to_string()), None)?;

    let up = ExporterMetrics::up()?;
    let failures = ExporterMetrics::scrape_failures()?;
    registry.register(Box::new(up.clone()))?;
    registry.register(Box::new(failures.clone()))?;

    failures.inc_by(outcome.scrape_failures);

    match &outcome.status {
        PollStatus::Down => up.set(0.0),
        PollStatus::Up(data) => {
            up.set(1.0);

            let metrics = ExporterMetrics::new()?;
            metrics.register(&registry)?;
            metrics.observe(data);
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ExporterError::Exposition(prometheus::Error::Msg(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKey, EventTotal, PoolSlot, RunStateCount, Workflow};
    use crate::orchestration::PollData;

    fn sample_data() -> PollData {
        PollData {
            workflows: vec![Workflow {
                workflow_id: "etl".to_string(),
                is_paused: Some(true),
                is_subdag: Some(false),
                is_active: None,
            }],
            event_totals: vec![EventTotal {
                key: EventKey::new("etl", "extract", "success"),
                count: 5,
            }],
            run_states: RunStateCount::with_default_states(vec![RunStateCount {
                workflow_id: "etl".to_string(),
                state: "running".to_string(),
                count: 2,
            }]),
            pool_slots: vec![PoolSlot {
                name: "default_pool".to_string(),
                slots: 128,
            }],
        }
    }

    #[test]
    fn test_up_outcome_emits_full_set() {
        let outcome = PollOutcome {
            status: PollStatus::Up(sample_data()),
            scrape_failures: 2,
        };

        let text = encode_outcome(&outcome).unwrap();

        assert!(text.contains("airflow_up 1"));
        assert!(text.contains("airflow_scrape_failures_total 2"));
        assert!(text.contains(r#"airflow_event_total{event="success",task="extract",workflow="etl"} 5"#));
        assert!(text.contains(r#"airflow_workflow_active{workflow="etl"} 0"#));
        assert!(text.contains(r#"airflow_workflow_paused{workflow="etl"} 1"#));
        assert!(text.contains(r#"airflow_workflow_run_state{state="running",workflow="etl"} 2"#));
        assert!(text.contains(r#"airflow_workflow_run_state{state="failed",workflow="etl"} 0"#));
        assert!(text.contains(r#"airflow_pool_slots{name="default_pool"} 128"#));
        assert!(text.contains("# TYPE airflow_event_total counter"));
        assert!(text.contains("# TYPE airflow_scrape_failures_total counter"));
    }

    #[test]
    fn test_down_outcome_suppresses_data_metrics() {
        let outcome = PollOutcome {
            status: PollStatus::Down,
            scrape_failures: 7,
        };

        let text = encode_outcome(&outcome).unwrap();

        assert!(text.contains("airflow_up 0"));
        assert!(text.contains("airflow_scrape_failures_total 7"));
        for suppressed in ["event_total", "workflow_active", "workflow_paused", "workflow_run_state", "pool_slots"] {
            assert!(!text.contains(suppressed), "{suppressed} leaked into a failed scrape");
        }
    }

    #[test]
    fn test_content_type_is_prometheus_text() {
        assert!(content_type().starts_with("text/plain"));
    }
}
