//! `/pp` courier proxy against a fake `ParcelPerfect`.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use scan_station_integration_tests::{CannedReply, FakeUpstream, TestApp, unreachable_url};
use serde_json::{Value, json};

fn quote_request() -> Value {
    json!({
        "method": "requestQuote",
        "classVal": "Quote",
        "params": { "details": { "origplace": 4001, "destplace": 4012 } }
    })
}

// ============================================================================
// POST /pp
// ============================================================================

#[tokio::test]
async fn test_call_requires_method_class_and_params() {
    let app = TestApp::new(&[("PP_BASE_URL", "https://pp.example.test/rpc")]);

    for body in [
        json!({}),
        json!({ "method": "requestQuote", "classVal": "Quote" }),
        json!({ "method": "requestQuote", "classVal": "Quote", "params": "nope" }),
        json!({ "method": "requestQuote", "classVal": "Quote", "params": null }),
        json!({ "method": "requestQuote", "classVal": "Quote", "params": [] }),
    ] {
        let response = app.post_json("/pp", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json(),
            json!({
                "error": "BAD_REQUEST",
                "message": "Expected { method, classVal, params } in body"
            })
        );
    }
}

#[tokio::test]
async fn test_call_without_base_url_is_config_error() {
    let app = TestApp::new(&[]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "CONFIG_ERROR", "message": "PP_BASE_URL must be a valid URL" })
    );
}

#[tokio::test]
async fn test_call_rejects_non_http_base_url() {
    let app = TestApp::new(&[("PP_BASE_URL", "ftp://pp.example.test")]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_call_posts_form_and_forwards_reply() {
    let upstream = FakeUpstream::single(
        "/rpc",
        CannedReply::json(
            StatusCode::CREATED,
            &json!({ "errorcode": 0, "results": [{ "quoteno": "Q1" }] }),
        ),
    )
    .await;
    let app = TestApp::new(&[
        ("PP_BASE_URL", &format!("{}/rpc", upstream.url())),
        ("PP_TOKEN", "pp-secret"),
    ]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.json()["results"][0]["quoteno"], "Q1");

    let request = upstream.only_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.headers["content-type"],
        "application/x-www-form-urlencoded"
    );
    let form = request.form_pairs();
    assert_eq!(form["method"], "requestQuote");
    assert_eq!(form["class"], "Quote");
    assert_eq!(form["token_id"], "pp-secret");
    let params: Value = serde_json::from_str(&form["params"]).unwrap();
    assert_eq!(params, quote_request()["params"]);
}

#[tokio::test]
async fn test_call_omits_token_when_not_required() {
    let upstream = FakeUpstream::single(
        "/rpc",
        CannedReply::json(StatusCode::OK, &json!({ "errorcode": 0 })),
    )
    .await;
    let app = TestApp::new(&[
        ("PP_BASE_URL", &format!("{}/rpc", upstream.url())),
        ("PP_TOKEN", "pp-secret"),
        ("PP_REQUIRE_TOKEN", "false"),
    ]);

    app.post_json("/pp", &quote_request()).await;

    assert!(!upstream.only_request().form_pairs().contains_key("token_id"));
}

#[tokio::test]
async fn test_call_passes_through_non_json_text() {
    let upstream = FakeUpstream::single(
        "/rpc",
        CannedReply::text(
            StatusCode::BAD_GATEWAY,
            Some("text/html"),
            "<h1>Gateway down</h1>",
        ),
    )
    .await;
    let app = TestApp::new(&[("PP_BASE_URL", &format!("{}/rpc", upstream.url()))]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.text(), "<h1>Gateway down</h1>");
}

#[tokio::test]
async fn test_call_defaults_content_type() {
    let upstream = FakeUpstream::single(
        "/rpc",
        CannedReply::text(StatusCode::OK, None, r#"{"errorcode":0}"#),
    )
    .await;
    let app = TestApp::new(&[("PP_BASE_URL", &format!("{}/rpc", upstream.url()))]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(
        response.header("content-type"),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(response.json(), json!({ "errorcode": 0 }));
}

#[tokio::test]
async fn test_call_transport_failure_is_bad_gateway() {
    let app = TestApp::new(&[("PP_BASE_URL", &unreachable_url().await)]);

    let response = app.post_json("/pp", &quote_request()).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["error"], "UPSTREAM_ERROR");
}

// ============================================================================
// GET /pp/place
// ============================================================================

#[tokio::test]
async fn test_place_requires_query() {
    let app = TestApp::new(&[]);

    for uri in ["/pp/place", "/pp/place?q=", "/pp/place?q=%20%20"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.json()["message"],
            "Missing ?q= query string for place search"
        );
    }
}

#[tokio::test]
async fn test_place_requires_token() {
    let app = TestApp::new(&[("PP_BASE_URL", "https://pp.example.test")]);

    let response = app.get("/pp/place?q=Durbanville").await;

    // A missing courier token is a server fault (500), unlike the 501 an
    // unconfigured Shopify or PrintNode answers with.
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "CONFIG_ERROR", "message": "PP_TOKEN is required for getPlace" })
    );
}

#[tokio::test]
async fn test_place_requires_base_url_after_token() {
    let app = TestApp::new(&[("PP_TOKEN", "pp-secret")]);

    let response = app.get("/pp/place?q=Durbanville").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["message"], "PP_BASE_URL must be a valid URL");
}

#[tokio::test]
async fn test_place_search_builds_get_place_query() {
    let upstream = FakeUpstream::single(
        "/",
        CannedReply::json(
            StatusCode::OK,
            &json!({ "errorcode": 0, "results": [{ "place": 4012, "town": "DURBANVILLE" }] }),
        ),
    )
    .await;
    let app = TestApp::new(&[
        ("PP_BASE_URL", &upstream.url()),
        ("PP_TOKEN", "pp-secret"),
        ("PP_ACCNUM", "ACC001"),
        ("PP_PLACE_ID", "StationOne"),
    ]);

    let response = app.get("/pp/place?query=%20Durbanville%20").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["results"][0]["place"], 4012);

    let request = upstream.only_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/");
    let query = request.query_pairs();
    assert_eq!(query["Class"], "Waybill");
    assert_eq!(query["method"], "getPlace");
    assert_eq!(query["token_id"], "pp-secret");
    assert_eq!(query["query"], "Durbanville");
    let params: Value = serde_json::from_str(&query["params"]).unwrap();
    assert_eq!(
        params,
        json!({ "id": "StationOne", "accnum": "ACC001", "ppcust": "" })
    );
}

#[tokio::test]
async fn test_place_search_forwards_raw_text_with_status() {
    let upstream = FakeUpstream::single(
        "/",
        CannedReply::text(StatusCode::SERVICE_UNAVAILABLE, Some("text/plain"), "busy"),
    )
    .await;
    let app = TestApp::new(&[("PP_BASE_URL", &upstream.url()), ("PP_TOKEN", "pp-secret")]);

    let response = app.get("/pp/place?q=Paarl").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "busy");
}
