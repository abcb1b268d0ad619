use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span, Instrument};

use crate::cache::EventCache;
use crate::database::AirflowSource;
use crate::error::SourceResult;
use crate::models::{EventTotal, PoolSlot, RunStateCount, Workflow};

/// Everything one successful poll read from the source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollData {
    pub workflows: Vec<Workflow>,
    /// Cumulative totals from the event cache, not just this poll's delta
    pub event_totals: Vec<EventTotal>,
    /// Zero-filled for the default run states
    pub run_states: Vec<RunStateCount>,
    pub pool_slots: Vec<PoolSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Up(PollData),
    /// At least one query failed; no data is reported for this poll
    Down,
}

/// Result of one poll, as handed to the metrics encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub status: PollStatus,
    /// Failed polls since process start, including this one
    pub scrape_failures: u64,
}

impl PollOutcome {
    pub fn is_up(&self) -> bool {
        matches!(self.status, PollStatus::Up(_))
    }
}

/// Runs polls against an [`AirflowSource`] and owns the state that outlives them.
///
/// The event cache and the failure counter live here for the lifetime of the
/// process. Everything else is rebuilt from scratch on every poll.
pub struct ScrapeOrchestrator {
    source: Arc<dyn AirflowSource>,
    cache: EventCache,
    failures: AtomicU64,
    polls: AtomicU64,
}

impl std::fmt::Debug for ScrapeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeOrchestrator")
            .field("cache", &self.cache)
            .field("failures", &self.failures)
            .field("polls", &self.polls)
            .finish_non_exhaustive()
    }
}

impl ScrapeOrchestrator {
    pub fn new(source: Arc<dyn AirflowSource>) -> Self {
        Self {
            source,
            cache: EventCache::new(),
            failures: AtomicU64::new(0),
            polls: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    /// Failed polls since process start. Never reset.
    pub fn scrape_failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Run one poll to completion.
    ///
    /// Never returns an error: a failing query marks the poll down, bumps the
    /// failure counter by one and is logged. The event cache is only touched when
    /// the log query itself succeeded.
    pub async fn poll(&self) -> PollOutcome {
        let poll_id = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        let result = self
            .collect()
            .instrument(info_span!("poll", poll_id))
            .await;

        match result {
            Ok(data) => {
                debug!(
                    poll_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    workflows = data.workflows.len(),
                    event_keys = data.event_totals.len(),
                    run_states = data.run_states.len(),
                    pools = data.pool_slots.len(),
                    "Poll completed"
                );
                PollOutcome {
                    status: PollStatus::Up(data),
                    scrape_failures: self.scrape_failures(),
                }
            }
            Err(e) => {
                let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                error!(
                    poll_id,
                    error = %e,
                    scrape_failures = failures,
                    "Error while collecting data from database"
                );
                PollOutcome {
                    status: PollStatus::Down,
                    scrape_failures: failures,
                }
            }
        }
    }

    /// Query each table in order; the first failure aborts the rest.
    async fn collect(&self) -> SourceResult<PollData> {
        let workflows = self.source.workflows().await?;

        let event_totals = self
            .cache
            .refresh(|after_id| self.source.event_deltas(after_id))
            .await?;

        let run_states = RunStateCount::with_default_states(self.source.run_state_counts().await?);

        let pool_slots = self.source.pool_slots().await?;

        Ok(PollData {
            workflows,
            event_totals,
            run_states,
            pool_slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::{EventDelta, EventKey};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Failing {
        Nothing,
        Workflows,
        EventDeltas,
        RunStates,
        PoolSlots,
    }

    /// Scripted source: each `event_deltas` call pops the next batch.
    struct ScriptedSource {
        failing: Mutex<Failing>,
        batches: Mutex<VecDeque<Vec<EventDelta>>>,
        watermarks_seen: Mutex<Vec<i64>>,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Vec<EventDelta>>) -> Self {
            Self {
                failing: Mutex::new(Failing::Nothing),
                batches: Mutex::new(batches.into()),
                watermarks_seen: Mutex::new(Vec::new()),
            }
        }

        fn fail_on(&self, failing: Failing) {
            *self.failing.lock().unwrap() = failing;
        }

        fn check(&self, operation: Failing) -> SourceResult<()> {
            if *self.failing.lock().unwrap() == operation {
                return Err(SourceError::invalid_row("test", "scripted failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AirflowSource for ScriptedSource {
        async fn workflows(&self) -> SourceResult<Vec<Workflow>> {
            self.check(Failing::Workflows)?;
            Ok(vec![Workflow {
                workflow_id: "etl".to_string(),
                is_paused: Some(false),
                is_subdag: Some(false),
                is_active: Some(true),
            }])
        }

        async fn event_deltas(&self, after_id: i64) -> SourceResult<Vec<EventDelta>> {
            self.watermarks_seen.lock().unwrap().push(after_id);
            self.check(Failing::EventDeltas)?;
            Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn run_state_counts(&self) -> SourceResult<Vec<RunStateCount>> {
            self.check(Failing::RunStates)?;
            Ok(vec![RunStateCount {
                workflow_id: "etl".to_string(),
                state: "success".to_string(),
                count: 3,
            }])
        }

        async fn pool_slots(&self) -> SourceResult<Vec<PoolSlot>> {
            self.check(Failing::PoolSlots)?;
            Ok(vec![PoolSlot {
                name: "default_pool".to_string(),
                slots: 128,
            }])
        }
    }

    fn delta(event: &str, count: u64, max_id: i64) -> EventDelta {
        EventDelta::new(EventKey::new("d", "t", event), count, max_id)
    }

    fn counts(outcome: &PollOutcome) -> Vec<(String, u64)> {
        match &outcome.status {
            PollStatus::Up(data) => data
                .event_totals
                .iter()
                .map(|t| (t.key.event.clone(), t.count))
                .collect(),
            PollStatus::Down => panic!("expected a successful poll"),
        }
    }

    #[tokio::test]
    async fn test_successful_poll_reports_everything() {
        let source = Arc::new(ScriptedSource::new(vec![vec![
            delta("success", 2, 5),
            delta("failed", 1, 7),
        ]]));
        let orchestrator = ScrapeOrchestrator::new(source.clone());

        let outcome = orchestrator.poll().await;

        assert!(outcome.is_up());
        assert_eq!(outcome.scrape_failures, 0);
        let PollStatus::Up(data) = &outcome.status else {
            panic!("expected a successful poll");
        };
        assert_eq!(data.workflows.len(), 1);
        assert_eq!(data.run_states.len(), 3);
        assert_eq!(data.pool_slots[0].slots, 128);
        assert_eq!(
            counts(&outcome),
            vec![("failed".to_string(), 1), ("success".to_string(), 2)]
        );
        assert_eq!(orchestrator.cache().current_watermark().await, 7);
    }

    #[tokio::test]
    async fn test_later_polls_query_from_watermark_and_accumulate() {
        let source = Arc::new(ScriptedSource::new(vec![
            vec![delta("success", 2, 5), delta("failed", 1, 7)],
            vec![delta("success", 3, 9)],
            vec![],
        ]));
        let orchestrator = ScrapeOrchestrator::new(source.clone());

        orchestrator.poll().await;
        let second = orchestrator.poll().await;
        let third = orchestrator.poll().await;

        assert_eq!(*source.watermarks_seen.lock().unwrap(), vec![0, 7, 9]);
        assert_eq!(
            counts(&second),
            vec![("failed".to_string(), 1), ("success".to_string(), 5)]
        );
        assert_eq!(counts(&third), counts(&second));
    }

    #[tokio::test]
    async fn test_failed_event_query_leaves_cache_untouched() {
        let source = Arc::new(ScriptedSource::new(vec![vec![delta("success", 2, 5)]]));
        let orchestrator = ScrapeOrchestrator::new(source.clone());
        orchestrator.poll().await;
        let before = orchestrator.cache().snapshot().await;

        source.fail_on(Failing::EventDeltas);
        let outcome = orchestrator.poll().await;

        assert_eq!(outcome.status, PollStatus::Down);
        assert_eq!(outcome.scrape_failures, 1);
        assert_eq!(orchestrator.cache().snapshot().await, before);
        assert_eq!(orchestrator.cache().current_watermark().await, 5);
    }

    #[tokio::test]
    async fn test_any_failing_query_marks_poll_down() {
        let source = Arc::new(ScriptedSource::new(Vec::new()));
        let orchestrator = ScrapeOrchestrator::new(source.clone());

        for (expected, failing) in [
            Failing::Workflows,
            Failing::EventDeltas,
            Failing::RunStates,
            Failing::PoolSlots,
        ]
        .into_iter()
        .enumerate()
        {
            source.fail_on(failing);
            let outcome = orchestrator.poll().await;
            assert_eq!(outcome.status, PollStatus::Down, "{failing:?}");
            assert_eq!(outcome.scrape_failures, expected as u64 + 1);
        }

        source.fail_on(Failing::Nothing);
        let recovered = orchestrator.poll().await;
        assert!(recovered.is_up());
        assert_eq!(recovered.scrape_failures, 4);
    }

    #[tokio::test]
    async fn test_failure_after_merge_keeps_merged_rows() {
        let source = Arc::new(ScriptedSource::new(vec![
            vec![delta("success", 2, 5)],
            vec![delta("success", 1, 6)],
        ]));
        let orchestrator = ScrapeOrchestrator::new(source.clone());
        source.fail_on(Failing::PoolSlots);

        let outcome = orchestrator.poll().await;
        assert_eq!(outcome.status, PollStatus::Down);

        source.fail_on(Failing::Nothing);
        let outcome = orchestrator.poll().await;
        assert_eq!(counts(&outcome), vec![("success".to_string(), 3)]);
        assert_eq!(*source.watermarks_seen.lock().unwrap(), vec![0, 5]);
    }
}
