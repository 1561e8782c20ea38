//! Year and source filtered event retrieval.
//!
//! Stored timestamps use a fixed-width UTC encoding, so a calendar year is
//! a plain string range over the `timestamp` index.

use lifegraph_core::YearRange;
use lifegraph_core::timestamp::from_storage;
use lifegraph_types::Event;
use serde_json::value::RawValue;
use sqlx::SqlitePool;

use crate::error::DbError;

const SELECT_YEAR: &str = r"SELECT id, source, context, timestamp, metadata, created_at
  FROM events
  WHERE timestamp >= ?1 AND timestamp < ?2
  ORDER BY timestamp DESC, id DESC";

const SELECT_YEAR_BY_SOURCE: &str = r"SELECT id, source, context, timestamp, metadata, created_at
  FROM events
  WHERE timestamp >= ?1 AND timestamp < ?2 AND source = ?3
  ORDER BY timestamp DESC, id DESC";

/// Read-only queries over the `events` table.
pub struct QueryEngine<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Events in `range`, most recent first, optionally restricted to one
    /// source by exact match.
    ///
    /// Returns an empty vector when nothing matches. Rows that cannot be
    /// decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn events_in_year(
        &self,
        range: &YearRange,
        source: Option<&str>,
    ) -> Result<Vec<Event>, DbError> {
        let (start, end) = range.storage_bounds();

        let rows = match source {
            Some(source) => {
                sqlx::query_as::<_, EventRow>(SELECT_YEAR_BY_SOURCE)
                    .bind(&start)
                    .bind(&end)
                    .bind(source)
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, EventRow>(SELECT_YEAR)
                    .bind(&start)
                    .bind(&end)
                    .fetch_all(self.pool)
                    .await?
            }
        };

        let events = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match row.into_event() {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::warn!(id, error = %e, "Skipping undecodable event row");
                        None
                    }
                }
            })
            .collect();

        Ok(events)
    }
}

/// A row from the `events` table.
///
/// Timestamps and metadata are kept as their stored text and decoded by
/// [`EventRow::into_event`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Surrogate key.
    pub id: i64,
    /// Producing category.
    pub source: String,
    /// Sub-label (empty when none).
    pub context: String,
    /// Fixed-width UTC timestamp text.
    pub timestamp: String,
    /// Metadata exactly as it was submitted.
    pub metadata: String,
    /// Fixed-width UTC ingestion time.
    pub created_at: String,
}

impl EventRow {
    /// Decode the stored text columns into an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] for a malformed timestamp and
    /// [`DbError::Serialization`] for malformed metadata.
    pub fn into_event(self) -> Result<Event, DbError> {
        let timestamp =
            from_storage(&self.timestamp).map_err(|e| DbError::Decode(e.to_string()))?;
        let created_at =
            from_storage(&self.created_at).map_err(|e| DbError::Decode(e.to_string()))?;
        let metadata = RawValue::from_string(self.metadata)?;

        Ok(Event {
            source: self.source,
            context: self.context,
            timestamp,
            metadata,
            created_at,
        })
    }
}
