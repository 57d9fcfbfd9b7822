//! Cross-cutting behavior of the HTTP edge: CORS, rate limiting, security
//! headers, request ids, body parsing and static/SPA serving.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use scan_station_integration_tests::{ALLOWED_ORIGIN, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_healthz() {
    let app = TestApp::new(&[]);

    let response = app.get("/healthz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "ok": true }));
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_unknown_origin_is_rejected_with_allow_list() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .uri("/healthz")
                .header("origin", "https://evil.example.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.json(),
        json!({
            "error": "CORS_ERROR",
            "message": "Origin https://evil.example.test is not allowed by CORS",
            "allowedOrigins": [ALLOWED_ORIGIN],
        })
    );
}

#[tokio::test]
async fn test_request_without_origin_passes() {
    let app = TestApp::new(&[]);

    let response = app.get("/healthz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_allowed_origin_receives_cors_headers() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .uri("/healthz")
                .header("origin", ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some(ALLOWED_ORIGIN)
    );
}

#[tokio::test]
async fn test_preflight_is_answered_without_routing() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/shopify/draft-orders")
                .header("origin", ALLOWED_ORIGIN)
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some(ALLOWED_ORIGIN)
    );
    assert_eq!(response.header("access-control-max-age"), Some("86400"));
    assert!(
        response
            .header("access-control-allow-methods")
            .unwrap()
            .contains("POST")
    );
}

#[tokio::test]
async fn test_bare_options_is_no_content() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/pp")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_multiple_origins_are_each_allowed() {
    let app = TestApp::new(&[(
        "FRONTEND_ORIGIN",
        "http://localhost:3000, https://station.example.test",
    )]);

    for origin in ["http://localhost:3000", "https://station.example.test"] {
        let response = app
            .send(
                Request::builder()
                    .uri("/healthz")
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "origin {origin}");
    }
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_headers_on_every_response() {
    let app = TestApp::new(&[]);

    let response = app.get("/healthz").await;

    assert_eq!(response.header("ratelimit-limit"), Some("120"));
    assert_eq!(response.header("ratelimit-remaining"), Some("119"));
    assert_eq!(response.header("ratelimit-policy"), Some("120;w=60"));
    assert!(response.header("ratelimit-reset").is_some());
}

#[tokio::test]
async fn test_rate_limit_rejects_over_budget() {
    let app = TestApp::new(&[("RATE_LIMIT_MAX", "2")]);

    assert_eq!(app.get("/healthz").await.status, StatusCode::OK);
    assert_eq!(app.get("/healthz").await.status, StatusCode::OK);

    let response = app.get("/healthz").await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json()["error"], "RATE_LIMITED");
    assert_eq!(response.header("ratelimit-remaining"), Some("0"));
    assert!(response.header("retry-after").is_some());
}

#[tokio::test]
async fn test_trusted_proxy_limits_per_forwarded_client() {
    let app = TestApp::new(&[("RATE_LIMIT_MAX", "1"), ("TRUST_PROXY", "true")]);

    let from = |ip: &str| {
        Request::builder()
            .uri("/healthz")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(app.send(from("203.0.113.1")).await.status, StatusCode::OK);
    assert_eq!(app.send(from("203.0.113.2")).await.status, StatusCode::OK);
    assert_eq!(
        app.send(from("203.0.113.1")).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn test_security_headers() {
    let app = TestApp::new(&[]);

    let response = app.get("/healthz").await;

    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(
        response.header("cross-origin-resource-policy"),
        Some("cross-origin")
    );
    assert!(response.header("content-security-policy").is_some());
    assert!(response.header("x-powered-by").is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .uri("/healthz")
                .header("x-request-id", "scan-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.header("x-request-id"), Some("scan-42"));
}

// ============================================================================
// Body parsing
// ============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new(&[]);

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/printnode/print")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = TestApp::new(&[]);
    let payload = json!({ "pdfBase64": "A".repeat(1024 * 1024 + 1) });

    let response = app.post_json("/printnode/print", &payload).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["error"], "BAD_REQUEST");
}

// ============================================================================
// Static files
// ============================================================================

#[tokio::test]
async fn test_unknown_get_falls_back_to_index() {
    let app = TestApp::new(&[]);

    let response = app.get("/scan/orders/1234").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("<title>index</title>"));
}

#[tokio::test]
async fn test_named_pages() {
    let app = TestApp::new(&[]);

    assert!(app.get("/flops").await.text().contains("<title>flops</title>"));
    assert!(app.get("/flocs").await.text().contains("<title>flocs</title>"));
}

#[tokio::test]
async fn test_static_asset_is_served() {
    let app = TestApp::new(&[]);

    let response = app.get("/app.js").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "console.log('scan station');");
}
