//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/contributions` | Ingest a batch of events |
//! | `GET` | `/api/contributions` | Events for a year (`?year=YYYY&source=NAME`) |
//! | `GET` | `/api/stats` | Totals, per-source counts, today, streak |
//! | `GET` | `/api/health` | Liveness check |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use lifegraph_core::{YearRange, today_utc};
use lifegraph_db::{Ingestor, QueryEngine, StatsEngine};
use lifegraph_types::{EventSubmission, IngestSummary};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /api/contributions`.
#[derive(Debug, serde::Deserialize)]
pub struct ContributionsQuery {
    /// Calendar year. Missing or empty means the current UTC year.
    pub year: Option<String>,
    /// Exact source filter. Missing or empty means all sources.
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /api/contributions
// ---------------------------------------------------------------------------

/// Ingest a JSON array of events.
///
/// The body is decoded directly rather than through the `Json` extractor so
/// that clients which omit `Content-Type` are still accepted. Responds
/// `201 Created` with the number of newly stored events.
pub async fn post_contributions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let batch: Vec<EventSubmission> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON: {e}")))?;

    let processed = Ingestor::new(state.db.pool()).ingest(batch).await?;

    Ok((StatusCode::CREATED, Json(IngestSummary::new(processed))))
}

// ---------------------------------------------------------------------------
// GET /api/contributions
// ---------------------------------------------------------------------------

/// Return the events of one calendar year, most recent first.
pub async fn list_contributions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContributionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = year_range(params.year.as_deref())?;
    let source = params.source.as_deref().filter(|s| !s.is_empty());

    let events = QueryEngine::new(state.db.pool())
        .events_in_year(&range, source)
        .await?;

    Ok(Json(events))
}

/// Resolve the `year` parameter into a range.
fn year_range(year: Option<&str>) -> Result<YearRange, ApiError> {
    let range = match year.map(str::trim).filter(|y| !y.is_empty()) {
        None => YearRange::current(),
        Some(raw) => {
            let year: i32 = raw
                .parse()
                .map_err(|e| ApiError::InvalidQuery(format!("Invalid year parameter: {e}")))?;
            YearRange::new(year)
        }
    };
    range.map_err(|e| ApiError::InvalidQuery(format!("Invalid year parameter: {e}")))
}

// ---------------------------------------------------------------------------
// GET /api/stats
// ---------------------------------------------------------------------------

/// Return statistics over the whole stored history.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = StatsEngine::new(state.db.pool())
        .compute(today_utc())
        .await?;
    Ok(Json(stats))
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
