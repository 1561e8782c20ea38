//! Integration tests for the contribution API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own in-memory database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use lifegraph_db::Database;
use lifegraph_server::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn make_router() -> Router {
    let db = Database::open_in_memory().await.unwrap();
    build_router(Arc::new(AppState::new(db)), None)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post(router: &Router, body: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/contributions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let router = make_router().await;
    let (status, json) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_post_returns_created_with_count() {
    let router = make_router().await;
    let (status, json) = post(
        &router,
        r#"[
            {"source":"git","context":"lifegraph","timestamp":"2024-05-01T10:00:00Z","metadata":{"hash":"abc"}},
            {"source":"fitness","context":"","timestamp":"2024-05-01T07:00:00Z"}
        ]"#,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["processed"], 2);
    assert_eq!(json["message"], "Processed 2 contributions");
}

#[tokio::test]
async fn test_post_same_event_twice() {
    let router = make_router().await;
    let body = r#"[{"source":"git","context":"repo","timestamp":"2024-05-01T10:00:00Z"}]"#;

    let (_, first) = post(&router, body).await;
    let (status, second) = post(&router, body).await;

    assert_eq!(first["processed"], 1);
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["processed"], 0);

    let (_, events) = get(&router, "/api/contributions?year=2024").await;
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_skips_invalid_events_silently() {
    let router = make_router().await;
    let (status, json) = post(
        &router,
        r#"[
            {"source":"","timestamp":"2024-05-01T10:00:00Z"},
            {"source":"git","timestamp":"someday"},
            {"source":"git"},
            {"source":"git","timestamp":"2024-05-01T10:00:00Z"}
        ]"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["processed"], 1);
}

#[tokio::test]
async fn test_post_empty_batch() {
    let router = make_router().await;
    let (status, json) = post(&router, "[]").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["processed"], 0);
}

#[tokio::test]
async fn test_post_malformed_body_is_bad_request() {
    let router = make_router().await;
    for body in ["not json", r#"{"source":"git"}"#, r#"[{"source":"git","#] {
        let (status, json) = post(&router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    let (_, stats) = get(&router, "/api/stats").await;
    assert_eq!(stats["total"], 0);
}

#[tokio::test]
async fn test_post_without_content_type() {
    let router = make_router().await;
    let response = router
        .oneshot(
            Request::post("/api/contributions")
                .body(Body::from(
                    r#"[{"source":"git","timestamp":"2024-05-01T10:00:00Z"}]"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_get_contributions_year_boundary() {
    let router = make_router().await;
    post(
        &router,
        r#"[
            {"source":"git","context":"x","timestamp":"2023-12-31T23:59:59Z"},
            {"source":"git","context":"x","timestamp":"2024-01-01T00:00:00Z"}
        ]"#,
    )
    .await;

    let (status, y2023) = get(&router, "/api/contributions?year=2023").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(y2023.as_array().unwrap().len(), 1);
    assert_eq!(y2023[0]["timestamp"], "2023-12-31T23:59:59Z");

    let (_, y2024) = get(&router, "/api/contributions?year=2024").await;
    assert_eq!(y2024.as_array().unwrap().len(), 1);
    assert_eq!(y2024[0]["timestamp"], "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_get_contributions_source_filter_and_order() {
    let router = make_router().await;
    post(
        &router,
        r#"[
            {"source":"a","context":"","timestamp":"2024-05-01T08:00:00Z"},
            {"source":"b","context":"","timestamp":"2024-05-01T09:00:00Z"},
            {"source":"a","context":"","timestamp":"2024-05-01T10:00:00Z"}
        ]"#,
    )
    .await;

    let (_, events) = get(&router, "/api/contributions?year=2024&source=a").await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e["source"] == "a"));
    assert_eq!(events[0]["timestamp"], "2024-05-01T10:00:00Z");
    assert_eq!(events[1]["timestamp"], "2024-05-01T08:00:00Z");

    let (_, all) = get(&router, "/api/contributions?year=2024&source=").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_contributions_returns_metadata_verbatim() {
    let router = make_router().await;
    post(
        &router,
        r#"[{"source":"reading","timestamp":"2024-08-01T20:00:00Z","metadata":{"title":"Dune","pages":[1,412]}}]"#,
    )
    .await;

    let (_, events) = get(&router, "/api/contributions?year=2024").await;
    assert_eq!(events[0]["metadata"], json!({"title": "Dune", "pages": [1, 412]}));
    assert_eq!(events[0]["context"], "");
    assert!(events[0]["created_at"].is_string());
}

async fn get_text(router: &Router, uri: &str) -> String {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_metadata_bytes_survive_round_trip() {
    let router = make_router().await;
    post(
        &router,
        r#"[{"source":"git","timestamp":"2024-08-01T20:00:00Z","metadata":{"z":1,"a":123456789012345678901234567890}}]"#,
    )
    .await;

    let body = get_text(&router, "/api/contributions?year=2024").await;
    assert!(
        body.contains(r#""metadata":{"z":1,"a":123456789012345678901234567890}"#),
        "body: {body}"
    );
}

#[tokio::test]
async fn test_null_metadata_is_not_replaced() {
    let router = make_router().await;
    post(
        &router,
        r#"[
            {"source":"git","context":"null","timestamp":"2024-08-01T20:00:00Z","metadata":null},
            {"source":"git","context":"omitted","timestamp":"2024-08-01T20:00:00Z"}
        ]"#,
    )
    .await;

    let (_, events) = get(&router, "/api/contributions?year=2024").await;
    let by_context = |context: &str| {
        events
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["context"] == context)
            .unwrap()["metadata"]
            .clone()
    };
    assert_eq!(by_context("null"), Value::Null);
    assert_eq!(by_context("omitted"), json!({}));
}

#[tokio::test]
async fn test_get_contributions_empty_is_array() {
    let router = make_router().await;
    let (status, json) = get(&router, "/api/contributions?year=1999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_get_contributions_defaults_to_current_year() {
    let router = make_router().await;
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    post(
        &router,
        &format!(r#"[{{"source":"git","timestamp":"{now}"}}, {{"source":"git","timestamp":"1999-06-01T00:00:00Z"}}]"#),
    )
    .await;

    let (status, events) = get(&router, "/api/contributions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_contributions_invalid_year() {
    let router = make_router().await;
    for uri in [
        "/api/contributions?year=abc",
        "/api/contributions?year=2024x",
        "/api/contributions?year=-5",
    ] {
        let (status, json) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(json["status"], 400);
    }
}

#[tokio::test]
async fn test_stats_empty() {
    let router = make_router().await;
    let (status, json) = get(&router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"total": 0, "by_source": {}, "current_streak": 0, "today": 0})
    );
}

#[tokio::test]
async fn test_stats_after_overlapping_ingestions() {
    let router = make_router().await;
    post(
        &router,
        r#"[
            {"source":"git","context":"a","timestamp":"2024-03-01T09:00:00Z"},
            {"source":"git","context":"a","timestamp":"2024-02-29T12:00:00Z"}
        ]"#,
    )
    .await;
    post(
        &router,
        r#"[
            {"source":"git","context":"a","timestamp":"2024-02-29T12:00:00Z"},
            {"source":"fitness","context":"","timestamp":"2023-07-04T06:00:00Z"}
        ]"#,
    )
    .await;

    let (status, json) = get(&router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["by_source"], json!({"fitness": 1, "git": 2}));
    assert!(json["today"].is_u64());
    assert!(json["current_streak"].is_u64());
}

#[tokio::test]
async fn test_api_responses_are_not_cacheable() {
    let router = make_router().await;
    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let cache = response
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(cache, "no-cache, no-store, must-revalidate");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let router = make_router().await;
    let response = router
        .clone()
        .oneshot(
            Request::get("/api/stats")
                .header(header::ORIGIN, "https://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let preflight = router
        .oneshot(
            Request::options("/api/contributions")
                .header(header::ORIGIN, "https://dashboard.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(preflight.status(), StatusCode::OK);
    assert!(
        preflight
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS)
    );
}

#[tokio::test]
async fn test_static_dir_is_served_as_fallback() {
    let dir = std::env::temp_dir().join(format!("lifegraph-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>dashboard</h1>").unwrap();

    let db = Database::open_in_memory().await.unwrap();
    let router = build_router(Arc::new(AppState::new(db)), Some(&dir));

    let response = router
        .clone()
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>dashboard</h1>");

    let (status, _) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);

    std::fs::remove_dir_all(&dir).unwrap();
}
