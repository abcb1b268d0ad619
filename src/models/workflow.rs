use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Run states that are always reported for a workflow, even at zero.
pub const DEFAULT_RUN_STATES: [&str; 3] = ["success", "failed", "running"];

/// Workflow (DAG) definition state
/// Maps to the `dag` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    pub workflow_id: String,
    pub is_paused: Option<bool>,
    pub is_subdag: Option<bool>,
    pub is_active: Option<bool>,
}

impl Workflow {
    /// NULL flags are reported as false.
    pub fn paused(&self) -> bool {
        self.is_paused.unwrap_or(false)
    }

    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }

    pub fn subdag(&self) -> bool {
        self.is_subdag.unwrap_or(false)
    }
}

/// Number of runs of one workflow in one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStateCount {
    pub workflow_id: String,
    pub state: String,
    pub count: u64,
}

impl RunStateCount {
    /// Expand grouped `dag_run` counts so that every workflow seen carries each of
    /// [`DEFAULT_RUN_STATES`], zero-filled when the source returned no row for it.
    ///
    /// States outside the default set are passed through unchanged.
    pub fn with_default_states(rows: impl IntoIterator<Item = RunStateCount>) -> Vec<RunStateCount> {
        let mut by_workflow: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

        for row in rows {
            let states = by_workflow.entry(row.workflow_id).or_insert_with(|| {
                DEFAULT_RUN_STATES
                    .iter()
                    .map(|state| ((*state).to_string(), 0))
                    .collect()
            });
            states.insert(row.state, row.count);
        }

        by_workflow
            .into_iter()
            .flat_map(|(workflow_id, states)| {
                states.into_iter().map(move |(state, count)| RunStateCount {
                    workflow_id: workflow_id.clone(),
                    state,
                    count,
                })
            })
            .collect()
    }
}

/// Pool slot capacity
/// Maps to the `slot_pool` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PoolSlot {
    pub name: String,
    pub slots: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(workflow_id: &str, state: &str, count: u64) -> RunStateCount {
        RunStateCount {
            workflow_id: workflow_id.to_string(),
            state: state.to_string(),
            count,
        }
    }

    #[test]
    fn test_default_states_are_zero_filled() {
        let expanded = RunStateCount::with_default_states(vec![row("etl", "success", 4)]);

        assert_eq!(
            expanded,
            vec![
                row("etl", "failed", 0),
                row("etl", "running", 0),
                row("etl", "success", 4),
            ]
        );
    }

    #[test]
    fn test_unknown_states_pass_through() {
        let expanded = RunStateCount::with_default_states(vec![
            row("etl", "queued", 2),
            row("report", "failed", 1),
        ]);

        assert_eq!(expanded.len(), 7);
        assert!(expanded.contains(&row("etl", "queued", 2)));
        assert!(expanded.contains(&row("report", "failed", 1)));
        assert!(expanded.contains(&row("report", "success", 0)));
    }

    #[test]
    fn test_no_rows_no_workflows() {
        assert!(RunStateCount::with_default_states(Vec::new()).is_empty());
    }

    #[test]
    fn test_null_workflow_flags_read_as_false() {
        let workflow = Workflow {
            workflow_id: "etl".to_string(),
            is_paused: None,
            is_subdag: None,
            is_active: Some(true),
        };

        assert!(!workflow.paused());
        assert!(!workflow.subdag());
        assert!(workflow.active());
    }
}
