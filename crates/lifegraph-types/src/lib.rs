//! Shared type definitions for the Lifegraph activity tracker.
//!
//! This crate is the single source of truth for the wire types exchanged
//! between collecting agents, the API server, and the dashboard. Types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`event`] -- Stored events, raw submissions, and validated inserts
//! - [`stats`] -- Aggregate statistics and ingestion summaries

pub mod event;
pub mod stats;

// Re-export all public types at crate root for convenience.
pub use event::{EMPTY_METADATA, Event, EventSubmission, NewEvent};
pub use stats::{IngestSummary, Stats};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::event::Event::export_all();
        let _ = crate::event::EventSubmission::export_all();
        let _ = crate::stats::Stats::export_all();
        let _ = crate::stats::IngestSummary::export_all();
    }
}
