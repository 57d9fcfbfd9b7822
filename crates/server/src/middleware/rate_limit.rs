//! Fixed-window rate limiting keyed by client IP.
//!
//! Each client gets `max_requests` per window. Windows live in a `moka`
//! cache whose time-to-live equals the window length, so a client's counter
//! disappears (and a fresh window starts) exactly one window after its first
//! request. Every response carries the IETF draft `RateLimit-*` headers.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Upper bound on tracked clients.
const MAX_TRACKED_CLIENTS: u64 = 100_000;

const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// One client's current window.
#[derive(Debug)]
struct Window {
    started: Instant,
    hits: AtomicU64,
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Whole seconds until the window resets (rounded up).
    pub reset_secs: u64,
    /// Window length in seconds.
    pub window_secs: u64,
}

/// Fixed-window request counter.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    windows: Cache<IpAddr, Arc<Window>>,
    max_requests: u64,
    window: Duration,
    trust_proxy: bool,
}

impl FixedWindowLimiter {
    /// Create a limiter from configuration.
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let windows = Cache::builder()
            .max_capacity(MAX_TRACKED_CLIENTS)
            .time_to_live(config.window)
            .build();

        Self {
            windows,
            max_requests: config.max_requests,
            window: config.window,
            trust_proxy: config.trust_proxy,
        }
    }

    /// Count one request from `client` and decide whether it may proceed.
    pub async fn check(&self, client: IpAddr) -> RateLimitDecision {
        let window = self
            .windows
            .get_with(client, async {
                Arc::new(Window {
                    started: Instant::now(),
                    hits: AtomicU64::new(0),
                })
            })
            .await;

        let hits = window.hits.fetch_add(1, Ordering::Relaxed) + 1;
        let remaining_time = self.window.saturating_sub(window.started.elapsed());
        let reset_secs = remaining_time
            .as_secs()
            .saturating_add(u64::from(remaining_time.subsec_nanos() > 0));

        RateLimitDecision {
            allowed: hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(hits),
            reset_secs,
            window_secs: self.window.as_secs(),
        }
    }

    /// Resolve the rate-limit key for a request.
    ///
    /// Uses the socket peer address unless `TRUST_PROXY` is set, in which
    /// case forwarding headers are consulted first.
    #[must_use]
    pub fn client_key(&self, request: &Request) -> IpAddr {
        if self.trust_proxy
            && let Some(ip) = forwarded_client_ip(request.headers())
        {
            return ip;
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| {
                addr.ip()
            })
    }
}

/// Real client IP from proxy headers.
///
/// Checks Cloudflare's `CF-Connecting-IP`, then the first hop of
/// `X-Forwarded-For`, then `X-Real-IP`, then Fly.io's `Fly-Client-IP`.
fn forwarded_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let parse = |name: &str, first_hop: bool| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| if first_hop { s.split(',').next() } else { Some(s) })
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    parse("cf-connecting-ip", false)
        .or_else(|| parse("x-forwarded-for", true))
        .or_else(|| parse("x-real-ip", false))
        .or_else(|| parse("fly-client-ip", false))
}

/// Middleware enforcing the per-client request budget.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = state.rate_limiter();
    let client = limiter.client_key(&request);
    let decision = limiter.check(client).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(%client, "Rate limit exceeded");
        AppError::RateLimited {
            retry_after_secs: decision.reset_secs,
        }
        .into_response()
    };

    let headers = response.headers_mut();
    if let Ok(policy) = HeaderValue::from_str(&format!(
        "{};w={}",
        decision.limit, decision.window_secs
    )) {
        headers.insert(RATELIMIT_POLICY, policy);
    }
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(decision.reset_secs));

    response
}
