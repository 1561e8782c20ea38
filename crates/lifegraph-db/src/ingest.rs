//! Deduplicated batch ingestion.
//!
//! A batch is applied inside one transaction. Each submission is validated
//! and then inserted with `INSERT OR IGNORE`, so a collision with the
//! `(source, context, timestamp)` constraint leaves the original row in
//! place and simply does not count. Invalid submissions are skipped the
//! same way. Any failure to begin, execute, or commit aborts the whole
//! batch; the transaction is rolled back on drop and nothing is persisted.

use chrono::Utc;
use lifegraph_core::timestamp::to_storage;
use lifegraph_core::validate_submission;
use lifegraph_types::{EventSubmission, NewEvent};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbError;

const INSERT_EVENT: &str = r"INSERT OR IGNORE INTO events (source, context, timestamp, metadata, created_at)
  VALUES (?1, ?2, ?3, ?4, ?5)";

/// Writes batches of submissions into the `events` table.
pub struct Ingestor<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Ingestor<'a> {
    /// Create a new ingestor bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Ingest a batch and return how many events were newly persisted.
    ///
    /// The count excludes both duplicates (already stored, or repeated
    /// within the batch) and submissions that failed validation. The two
    /// cases are deliberately indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the transaction cannot be opened, a
    /// statement cannot be prepared or executed, or the commit fails. In
    /// every such case no event from the batch is persisted.
    pub async fn ingest(&self, batch: Vec<EventSubmission>) -> Result<u64, DbError> {
        let submitted = batch.len();
        let created_at = to_storage(Utc::now());

        let mut tx = self.pool.begin().await?;
        let mut processed: u64 = 0;

        for submission in batch {
            let event = match validate_submission(submission) {
                Ok(event) => event,
                Err(reason) => {
                    tracing::debug!(%reason, "Skipping invalid submission");
                    continue;
                }
            };
            processed = processed.saturating_add(insert_one(&mut tx, &event, &created_at).await?);
        }

        tx.commit().await?;

        tracing::info!(processed, submitted, "Ingested contributions");
        Ok(processed)
    }
}

/// Insert one event, returning 1 if a row was written and 0 on collision.
async fn insert_one(
    tx: &mut Transaction<'_, Sqlite>,
    event: &NewEvent,
    created_at: &str,
) -> Result<u64, DbError> {
    let result = sqlx::query(INSERT_EVENT)
        .bind(&event.source)
        .bind(&event.context)
        .bind(to_storage(event.timestamp))
        .bind(event.metadata_json())
        .bind(created_at)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
