//! # Poll Orchestration
//!
//! One scrape request runs one poll: query every Airflow table, fold the log
//! deltas into the [`EventCache`](crate::cache::EventCache), and hand the result
//! to the metrics encoder. There are no background tasks; a poll only runs when
//! a scrape asks for it.

pub mod poller;

pub use poller::{PollData, PollOutcome, PollStatus, ScrapeOrchestrator};
