//! Aggregate statistics and ingestion results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Statistics over the entire stored history, served by `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Stats {
    /// Number of stored events.
    pub total: u64,
    /// Event count per source. Every stored source appears.
    pub by_source: BTreeMap<String, u64>,
    /// Consecutive active days ending at or near today.
    pub current_streak: u32,
    /// Events whose timestamp falls on the current UTC day.
    pub today: u64,
}

/// Result of ingesting one batch, returned by `POST /api/contributions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IngestSummary {
    /// Events newly persisted by this batch.
    pub processed: u64,
    /// Human-readable summary line.
    pub message: String,
}

impl IngestSummary {
    /// Build the summary for a batch that persisted `processed` events.
    pub fn new(processed: u64) -> Self {
        Self {
            processed,
            message: format!("Processed {processed} contributions"),
        }
    }
}
