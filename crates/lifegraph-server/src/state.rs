//! Shared application state for the contribution API.

use lifegraph_db::Database;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. The database handle is opened before the router is built
/// and closed by the binary after the server stops.
#[derive(Clone)]
pub struct AppState {
    /// The event database.
    pub db: Database,
}

impl AppState {
    /// Create application state around an open database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}
