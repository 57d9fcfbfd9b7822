//! Scan station backend proxy.
//!
//! Sits between the browser-based warehouse scanning UI and three upstreams
//! (`ParcelPerfect`, Shopify Admin, `PrintNode`), keeping their credentials
//! server-side. This crate exposes the router as a library so the binary and
//! the integration tests assemble the exact same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod parcel_perfect;
pub mod printnode;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod upstream;

use std::any::Any;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Request, Response},
    response::IntoResponse,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::error::AppError;
use crate::state::AppState;

/// Largest accepted request body (base64 label PDFs included).
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the complete application router.
///
/// Layer order, outermost first: panic catcher, security headers, request
/// tracing, request id, CORS guard, `OPTIONS` status, CORS headers, rate
/// limit, body limit. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let public_dir = state.config().public_dir.clone();
    let spa_index = ServeFile::new(public_dir.join("index.html"));

    Router::new()
        .merge(routes::routes())
        .route_service("/flops", ServeFile::new(public_dir.join("flops.html")))
        .route_service("/flocs", ServeFile::new(public_dir.join("flocs.html")))
        .fallback_service(ServeDir::new(&public_dir).fallback(spa_index))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(middleware::cors_layer(&state.config().allowed_origins))
        .layer(axum::middleware::from_fn(
            middleware::options_no_content_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors_guard_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Render a handler panic as a `SERVER_ERROR` envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("Unknown error");

    AppError::Internal(message.to_string()).into_response()
}
