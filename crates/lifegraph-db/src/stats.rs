//! Aggregate statistics over the full event history.
//!
//! Every call re-reads the store; nothing is cached. The day boundary is
//! UTC for both the "today" count and the streak, and the streak lookback
//! is capped at [`STREAK_LOOKBACK_DAYS`] distinct days no matter how much
//! history is stored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lifegraph_core::timestamp::stored_date;
use lifegraph_core::{DayRange, STREAK_LOOKBACK_DAYS, current_streak};
use lifegraph_types::Stats;
use sqlx::SqlitePool;

use crate::error::DbError;

/// Read-only statistics over the `events` table.
pub struct StatsEngine<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsEngine<'a> {
    /// Create a new stats engine bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute all statistics relative to `today` (a UTC date).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any query fails.
    pub async fn compute(&self, today: NaiveDate) -> Result<Stats, DbError> {
        let total = self.total().await?;
        let by_source = self.by_source().await?;
        let today_count = self.count_on(today).await?;
        let days = self.active_days().await?;
        let current_streak = current_streak(today, days);

        tracing::debug!(total, today = today_count, current_streak, "Computed stats");

        Ok(Stats {
            total,
            by_source,
            current_streak,
            today: today_count,
        })
    }

    /// Number of stored events.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn total(&self) -> Result<u64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool)
            .await?;
        Ok(to_count(count))
    }

    /// Event count per source.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn by_source(&self) -> Result<BTreeMap<String, u64>, DbError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT source, COUNT(*) FROM events GROUP BY source")
                .fetch_all(self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(source, count)| (source, to_count(count)))
            .collect())
    }

    /// Number of events whose timestamp falls on `date` (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Calendar`] if `date` has no following day, or
    /// [`DbError::Sqlite`] if the query fails.
    pub async fn count_on(&self, date: NaiveDate) -> Result<u64, DbError> {
        let (start, end) = DayRange::new(date)?.storage_bounds();
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM events WHERE timestamp >= ?1 AND timestamp < ?2")
                .bind(start)
                .bind(end)
                .fetch_one(self.pool)
                .await?;
        Ok(to_count(count))
    }

    /// The most recent distinct active days, newest first, at most
    /// [`STREAK_LOOKBACK_DAYS`] of them.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn active_days(&self) -> Result<Vec<NaiveDate>, DbError> {
        let limit = i64::try_from(STREAK_LOOKBACK_DAYS).unwrap_or(i64::MAX);
        let rows: Vec<(String,)> = sqlx::query_as(
            r"SELECT DISTINCT substr(timestamp, 1, 10) AS day
              FROM events
              ORDER BY day DESC
              LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let days = rows
            .into_iter()
            .filter_map(|(day,)| match stored_date(&day) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!(day, error = %e, "Skipping undecodable event day");
                    None
                }
            })
            .collect();
        Ok(days)
    }
}

fn to_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
