//! Origin allow-list enforcement.
//!
//! Two pieces cooperate: [`cors_guard_middleware`] rejects browser requests
//! from unknown origins with a JSON 403, and [`cors_layer`] decorates the
//! requests it lets through with CORS response headers and answers
//! preflights. Requests without an `Origin` header (curl, same-origin
//! navigation) pass untouched.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AllowedOrigins;
use crate::error::AppError;
use crate::state::AppState;

/// How long browsers may cache a preflight result.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Reject requests whose `Origin` is not on the allow-list.
pub async fn cors_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let allowed = &state.config().allowed_origins;

    if let Some(origin) = request.headers().get(ORIGIN) {
        let origin = String::from_utf8_lossy(origin.as_bytes()).into_owned();
        if !allowed.contains(&origin) {
            tracing::warn!(%origin, "Rejected cross-origin request");
            return AppError::CorsRejected {
                origin,
                allowed_origins: allowed.as_slice().to_vec(),
            }
            .into_response();
        }
    }

    next.run(request).await
}

/// CORS response headers for allowed origins.
#[must_use]
pub fn cors_layer(allowed: &AllowedOrigins) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(PREFLIGHT_MAX_AGE)
}

/// Report answered `OPTIONS` requests as 204 No Content.
///
/// Sits outside [`cors_layer`], which answers every `OPTIONS` request itself.
pub async fn options_no_content_middleware(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_options && response.status().is_success() {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}
