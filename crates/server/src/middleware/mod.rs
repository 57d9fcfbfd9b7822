//! HTTP middleware stack for the scan station proxy.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture panics)
//! 2. Panic catcher (JSON `SERVER_ERROR`)
//! 3. Security headers
//! 4. `TraceLayer` (request span)
//! 5. Request ID (recorded on the request span)
//! 6. CORS guard (403 for unknown origins)
//! 7. `OPTIONS` replies reported as 204
//! 8. `CorsLayer` (CORS headers, answers every `OPTIONS`)
//! 9. Rate limiting (fixed window per client)
//! 10. Body limit (1 MB)

pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use cors::{cors_guard_middleware, cors_layer, options_no_content_middleware};
pub use rate_limit::{FixedWindowLimiter, rate_limit_middleware};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
