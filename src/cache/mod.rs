//! # Incremental Event Cache
//!
//! Accumulates `log` table counts across polls without re-reading old rows.
//!
//! ## Architecture
//!
//! ```text
//! EventCache
//!   └── tokio::sync::Mutex<CacheState>
//!         ├── totals: BTreeMap<EventKey, u64>   <- cumulative counts, keys never removed
//!         └── watermark: i64                    <- highest log.id merged so far
//! ```
//!
//! The source is queried for rows with `id > watermark`, the result is merged, and
//! the full totals are read back, all inside one critical section. Two overlapping
//! scrapes therefore never see the same watermark, and no reader ever observes a
//! half-applied merge.
//!
//! ## Source precondition
//!
//! The `log` table must be append-only with ids that are never reused. The cache
//! only adds; if ids were recycled or rows compacted away it would silently skip
//! or undercount rows.

use std::collections::BTreeMap;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{EventDelta, EventKey, EventTotal};

/// Cumulative event totals and the log cursor, guarded as one unit
#[derive(Debug, Default)]
pub struct EventCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    totals: BTreeMap<EventKey, u64>,
    watermark: i64,
}

impl CacheState {
    fn merge(&mut self, deltas: &[EventDelta]) {
        for delta in deltas {
            let total = self.totals.entry(delta.key.clone()).or_insert(0);
            *total = total.saturating_add(delta.count);
            self.watermark = self.watermark.max(delta.max_id);
        }
    }

    fn snapshot(&self) -> Vec<EventTotal> {
        self.totals
            .iter()
            .map(|(key, count)| EventTotal {
                key: key.clone(),
                count: *count,
            })
            .collect()
    }
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of deltas and advance the watermark to the highest `max_id` seen.
    ///
    /// The whole batch is applied while the lock is held. An empty batch is a no-op.
    pub async fn merge(&self, deltas: &[EventDelta]) {
        let mut state = self.state.lock().await;
        state.merge(deltas);
    }

    /// Every key ever merged with its cumulative count, ordered by key.
    pub async fn snapshot(&self) -> Vec<EventTotal> {
        self.state.lock().await.snapshot()
    }

    /// Exclusive lower bound for the next `log` query.
    pub async fn current_watermark(&self) -> i64 {
        self.state.lock().await.watermark
    }

    /// Fetch deltas past the current watermark, merge them and return the snapshot.
    ///
    /// The lock is held across `fetch`, so concurrent refreshes are serialized and
    /// each one queries from the watermark left by the previous. If `fetch` fails
    /// nothing is merged and the error is returned as-is.
    pub async fn refresh<F, Fut, E>(&self, fetch: F) -> Result<Vec<EventTotal>, E>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<Vec<EventDelta>, E>>,
    {
        let mut state = self.state.lock().await;
        let from = state.watermark;
        let deltas = fetch(from).await?;

        state.merge(&deltas);

        debug!(
            rows = deltas.len(),
            from_watermark = from,
            to_watermark = state.watermark,
            keys = state.totals.len(),
            "Merged event deltas"
        );

        Ok(state.snapshot())
    }
}
