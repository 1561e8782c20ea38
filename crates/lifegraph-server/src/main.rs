//! Lifegraph contribution server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from environment variables
//! 2. Initialize structured logging (tracing)
//! 3. Open the `SQLite` database and ensure the schema exists
//! 4. Serve the HTTP API until a shutdown signal arrives
//! 5. Close the database

use std::sync::Arc;

use anyhow::Context;
use lifegraph_db::{Database, SqliteConfig};
use lifegraph_server::{AppConfig, AppState, LogFormat, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the database, or the server fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format);

    info!("lifegraph-server starting");
    info!(
        host = %config.server.host,
        port = config.server.port,
        db_path = %config.db_path.display(),
        db_max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    if let Some(dir) = config.server.static_dir.take() {
        if tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            config.server.static_dir = Some(dir);
        } else {
            warn!(static_dir = %dir.display(), "Static directory not found, dashboard disabled");
        }
    }

    let db_config =
        SqliteConfig::file(&config.db_path).with_max_connections(config.db_max_connections);
    let db = Database::connect(&db_config)
        .await
        .context("failed to open database")?;
    db.init_schema()
        .await
        .context("failed to initialize schema")?;

    let state = Arc::new(AppState::new(db.clone()));
    let served = start_server(&config.server, state).await;

    db.close().await;
    served.context("server failed")?;

    info!("lifegraph-server shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
