//! Data layer for the Lifegraph activity tracker (`SQLite`).
//!
//! A single `events` table holds every accepted event. The table carries a
//! `UNIQUE(source, context, timestamp)` constraint so deduplication holds
//! even with concurrent writers, and indexes on `timestamp` and `source`
//! for the range and equality scans the readers perform.
//!
//! # Architecture
//!
//! ```text
//! POST batch --> Ingestor ----(one transaction)----+
//!                                                  v
//!                                          Database (SqlitePool)
//!                                                  ^
//! GET year   --> QueryEngine ---(read only)--------+
//! GET stats  --> StatsEngine ---(read only)--------+
//! ```
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool, configuration, and schema
//! - [`ingest`] -- Deduplicated batch ingestion
//! - [`query`] -- Year and source filtered retrieval
//! - [`stats`] -- Totals, per-source counts, today, and the streak
//! - [`error`] -- Shared error types

pub mod error;
pub mod ingest;
pub mod query;
pub mod sqlite;
pub mod stats;

// Re-export primary types for convenience.
pub use error::DbError;
pub use ingest::Ingestor;
pub use query::{EventRow, QueryEngine};
pub use sqlite::{Database, SqliteConfig, SqliteLocation};
pub use stats::StatsEngine;
