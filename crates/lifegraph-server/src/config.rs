//! Process configuration loaded from the environment.
//!
//! Every variable is optional:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `DB_PATH` | `./data/contributions.db` |
//! | `DB_MAX_CONNECTIONS` | `5` |
//! | `STATIC_DIR` | `./static` |
//! | `LOG_FORMAT` | `pretty` (or `json`) |
//!
//! The log filter itself comes from `RUST_LOG` via `EnvFilter`.

use std::path::PathBuf;

use crate::server::ServerConfig;

/// Default database file.
const DEFAULT_DB_PATH: &str = "./data/contributions.db";

/// Default dashboard directory.
const DEFAULT_STATIC_DIR: &str = "./static";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server settings. `static_dir` is the configured directory
    /// whether or not it exists; the binary checks before serving it.
    pub server: ServerConfig,
    /// `SQLite` database file.
    pub db_path: PathBuf,
    /// Connection pool size.
    pub db_max_connections: u32,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", var("PORT"), defaults.port)?;
        let db_path = var("DB_PATH").map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let db_max_connections = parse_or::<u32>("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 5)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: String::from("must be at least 1"),
            });
        }
        let static_dir =
            var("STATIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);
        let log_format = match var("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            None | Some("pretty" | "text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    reason: format!("unknown format {other}"),
                });
            }
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                static_dir: Some(static_dir),
            },
            db_path,
            db_max_connections,
            log_format,
        })
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{raw}: {e}"),
        })
    })
}
