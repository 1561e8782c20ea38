//! Contribution API server for the Lifegraph activity tracker.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion** (`POST /api/contributions`) for collecting agents
//! - **Queries** (`GET /api/contributions`) for one calendar year,
//!   optionally narrowed to a single source
//! - **Statistics** (`GET /api/stats`) including the current streak
//! - **Liveness** (`GET /api/health`)
//! - **Static dashboard** files served at `/` when a static directory is
//!   configured
//!
//! # Architecture
//!
//! Handlers are stateless apart from the shared [`AppState`], which owns
//! the database pool. Every request reads or writes the store directly;
//! there is no in-process cache.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError, LogFormat};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
