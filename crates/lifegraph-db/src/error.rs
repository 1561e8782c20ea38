//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `SQLite` operation failed (open, begin, execute, or commit).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A calendar range could not be built.
    #[error("Calendar error: {0}")]
    Calendar(#[from] lifegraph_core::CalendarError),

    /// A stored value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
