//! Baseline security headers for every response.
//!
//! The scan station UI is served from this process, but its JSON and label
//! assets are also fetched by the separately hosted front end, so resources
//! are marked `cross-origin` rather than `same-origin`.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
    },
    middleware::Next,
    response::Response,
};

/// Add security headers to all responses.
///
/// Headers applied:
/// - `Content-Security-Policy` - same-origin scripts and connections, inline
///   styles and `data:`/`blob:` images for rendered labels
/// - `Cross-Origin-Opener-Policy: same-origin`
/// - `Cross-Origin-Resource-Policy: cross-origin`
/// - `Origin-Agent-Cluster: ?1`
/// - `Referrer-Policy: no-referrer`
/// - `Strict-Transport-Security: max-age=31536000; includeSubDomains`
/// - `X-Content-Type-Options: nosniff`
/// - `X-DNS-Prefetch-Control: off`
/// - `X-Download-Options: noopen`
/// - `X-Frame-Options: SAMEORIGIN`
/// - `X-Permitted-Cross-Domain-Policies: none`
/// - `X-XSS-Protection: 0`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             base-uri 'self'; \
             font-src 'self' https: data:; \
             form-action 'self'; \
             frame-ancestors 'self'; \
             img-src 'self' data: blob:; \
             object-src 'none'; \
             script-src 'self'; \
             script-src-attr 'none'; \
             style-src 'self' https: 'unsafe-inline'; \
             upgrade-insecure-requests",
        ),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("origin-agent-cluster"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );
    headers.insert(
        HeaderName::from_static("x-download-options"),
        HeaderValue::from_static("noopen"),
    );
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        HeaderName::from_static("x-permitted-cross-domain-policies"),
        HeaderValue::from_static("none"),
    );
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("0"));

    response
}
