//! `SQLite` connection pool, configuration, and schema.
//!
//! The [`Database`] handle is opened once at startup, shared by reference
//! with every component, and closed at shutdown. `SQLite` accepts a single
//! writer at a time; file-backed databases run in WAL mode with a busy
//! timeout so concurrent ingestion batches queue up instead of failing, and
//! readers are not blocked by a writer.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time checked)
//! to avoid requiring a database at build time. All queries are
//! parameterized.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a pooled connection.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Default time a writer waits on a locked database.
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Default idle timeout in seconds.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Schema statements, each idempotent.
const SCHEMA: [&str; 3] = [
    r"CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source TEXT NOT NULL,
        context TEXT NOT NULL DEFAULT '',
        timestamp TEXT NOT NULL,
        metadata TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        UNIQUE(source, context, timestamp)
    )",
    "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_events_source ON events(source)",
];

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    /// A database file, created if missing.
    File(PathBuf),
    /// A private in-memory database that lives as long as the pool.
    Memory,
}

/// Configuration for the `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database location.
    pub location: SqliteLocation,
    /// Maximum number of connections in the pool. Ignored for
    /// [`SqliteLocation::Memory`], which always uses one connection.
    pub max_connections: u32,
    /// Time to wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// Time a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl SqliteConfig {
    /// Configuration for a database file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_location(SqliteLocation::File(path.into()))
    }

    /// Configuration for a fresh in-memory database.
    pub const fn in_memory() -> Self {
        Self::with_location(SqliteLocation::Memory)
    }

    const fn with_location(location: SqliteLocation) -> Self {
        Self {
            location,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the busy timeout.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, DbError> {
        let options = match &self.location {
            SqliteLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            SqliteLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::Config(format!("Invalid in-memory options: {e}")))?,
        };
        Ok(options.busy_timeout(self.busy_timeout))
    }
}

/// Connection pool handle to the event database.
///
/// Wraps a [`sqlx::SqlitePool`]. The ingestion, query, and stats components
/// borrow the pool through [`Database::pool`].
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`.
    ///
    /// The parent directory of a database file is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the connection fails.
    /// Returns [`DbError::Config`] if the location is unusable.
    pub async fn connect(config: &SqliteConfig) -> Result<Self, DbError> {
        if let SqliteLocation::File(path) = &config.location {
            ensure_parent_dir(path).await?;
        }
        let options = config.connect_options()?;

        let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);
        let pool_options = match config.location {
            // The in-memory database is dropped with its last connection.
            SqliteLocation::Memory => pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
            SqliteLocation::File(_) => pool_options
                .max_connections(config.max_connections)
                .idle_timeout(config.idle_timeout),
        };
        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            location = ?config.location,
            max_connections = config.max_connections,
            "Connected to SQLite"
        );

        Ok(Self { pool })
    }

    /// Open a fresh in-memory database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        let db = Self::connect(&SqliteConfig::in_memory()).await?;
        db.init_schema().await?;
        Ok(db)
    }

    /// Create the `events` table and its indexes if they do not exist.
    ///
    /// Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if a statement fails.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Event schema ready");
        Ok(())
    }

    /// Return a reference to the underlying [`SqlitePool`].
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<(), DbError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
        DbError::Config(format!(
            "cannot create database directory {}: {e}",
            parent.display()
        ))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_config_defaults() {
        let config = SqliteConfig::file("./data/contributions.db");
        assert_eq!(
            config.location,
            SqliteLocation::File(PathBuf::from("./data/contributions.db"))
        );
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.busy_timeout,
            Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS)
        );
    }

    #[test]
    fn builder_overrides() {
        let config = SqliteConfig::in_memory()
            .with_max_connections(2)
            .with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        db.init_schema().await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_events_%'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(count, 2);
        db.close().await;
    }
}
