//! Axum router construction for the contribution API.
//!
//! Assembles the API routes into a single [`Router`] with CORS enabled
//! for any origin and `Cache-Control: no-store` on every API response so
//! the dashboard always sees fresh data when switching years.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Cache policy applied to API responses.
const API_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /api/contributions` -- ingest a batch
/// - `GET /api/contributions` -- events for a year
/// - `GET /api/stats` -- aggregate statistics
/// - `GET /api/health` -- liveness check
/// - fallback -- files under `static_dir`, when given
pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route(
            "/api/contributions",
            get(handlers::list_contributions).post(handlers::post_contributions),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/health", get(handlers::health))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(API_CACHE_CONTROL),
        ));

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
