//! Test harness for the scan station proxy.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! and point the upstream base URLs at [`FakeUpstream`] servers bound to
//! `127.0.0.1:0`, so no test touches the network or a real credential.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p scan-station-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use scan_station::config::ScanStationConfig;
use scan_station::state::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Fake upstream
// =============================================================================

/// A request received by a [`FakeUpstream`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    /// Decoded query string pairs.
    #[must_use]
    pub fn query_pairs(&self) -> HashMap<String, String> {
        decode_pairs(self.query.as_deref().unwrap_or_default())
    }

    /// Decoded form body pairs.
    #[must_use]
    pub fn form_pairs(&self) -> HashMap<String, String> {
        decode_pairs(&self.body)
    }

    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Canned reply for one path.
#[derive(Debug, Clone)]
pub struct CannedReply {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl CannedReply {
    /// JSON reply.
    #[must_use]
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
        }
    }

    /// Reply with an explicit (or absent) content type.
    #[must_use]
    pub fn text(status: StatusCode, content_type: Option<&'static str>, body: &str) -> Self {
        Self {
            status,
            content_type,
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response {
        let mut response = (self.status, Body::from(self.body)).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}

/// In-process HTTP server standing in for `ParcelPerfect`, Shopify or
/// `PrintNode`. Replies by exact path and records every request.
pub struct FakeUpstream {
    addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeUpstream {
    /// Start a server answering `routes` (path to reply); other paths get a
    /// Shopify-style 404.
    pub async fn start(routes: Vec<(String, CannedReply)>) -> Self {
        let routes: Arc<HashMap<String, CannedReply>> = Arc::new(routes.into_iter().collect());
        let captured = Arc::new(Mutex::new(Vec::new()));

        let recorder = Arc::clone(&captured);
        let app = Router::new().fallback(move |request: Request<Body>| {
            let routes = Arc::clone(&routes);
            let recorder = Arc::clone(&recorder);
            async move {
                let (parts, body) = request.into_parts();
                let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
                let path = parts.uri.path().to_string();

                recorder.lock().unwrap().push(CapturedRequest {
                    method: parts.method,
                    path: path.clone(),
                    query: parts.uri.query().map(String::from),
                    headers: parts.headers,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });

                routes.get(&path).cloned().map_or_else(
                    || {
                        CannedReply::json(
                            StatusCode::NOT_FOUND,
                            &serde_json::json!({ "errors": "Not Found" }),
                        )
                        .into_response()
                    },
                    CannedReply::into_response,
                )
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, captured }
    }

    /// Start a server with a single canned path.
    pub async fn single(path: &str, reply: CannedReply) -> Self {
        Self::start(vec![(path.to_string(), reply)]).await
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    /// The only request received; panics unless exactly one arrived.
    #[must_use]
    pub fn only_request(&self) -> CapturedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn decode_pairs(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

// =============================================================================
// Application under test
// =============================================================================

/// Origin allowed by default in [`TestApp`].
pub const ALLOWED_ORIGIN: &str = "https://scan.example.test";

/// The proxy router plus a throwaway public directory.
pub struct TestApp {
    router: Router,
    _public_dir: TempDir,
}

impl TestApp {
    /// Build the app from environment-style settings.
    ///
    /// `FRONTEND_ORIGIN` defaults to [`ALLOWED_ORIGIN`] and `PUBLIC_DIR` to a
    /// temporary directory holding `index.html`, `flops.html`, `flocs.html`
    /// and `app.js`.
    #[must_use]
    pub fn new(vars: &[(&str, &str)]) -> Self {
        let public_dir = tempfile::tempdir().unwrap();
        for (file, contents) in [
            ("index.html", "<!doctype html><title>index</title>"),
            ("flops.html", "<!doctype html><title>flops</title>"),
            ("flocs.html", "<!doctype html><title>flocs</title>"),
            ("app.js", "console.log('scan station');"),
        ] {
            std::fs::write(public_dir.path().join(file), contents).unwrap();
        }

        let mut env: HashMap<String, String> = HashMap::from([
            ("FRONTEND_ORIGIN".to_string(), ALLOWED_ORIGIN.to_string()),
            (
                "PUBLIC_DIR".to_string(),
                public_dir.path().to_string_lossy().into_owned(),
            ),
        ]);
        env.extend(vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let config = ScanStationConfig::from_lookup(|key| env.get(key).cloned());
        let state = AppState::new(config).unwrap();

        Self {
            router: scan_station::app(state),
            _public_dir: public_dir,
        }
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` a path.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// `POST` a JSON body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Buffered response from the app.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
