//! Scan station configuration loaded from environment variables.
//!
//! Loading never fails. Absent upstream settings become empty values and each
//! adapter checks its own capability predicate at request time, so the proxy
//! can run with only some upstreams configured.
//!
//! # Environment Variables
//!
//! ## Server
//! - `APP_ENV` - `production` switches to JSON logs (default: development)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `FRONTEND_ORIGIN` - Comma-separated CORS allow-list (default: `http://localhost:3000`)
//! - `PUBLIC_DIR` - Static asset directory (default: public)
//! - `TRUST_PROXY` - Key rate limits on forwarding headers (default: false)
//! - `RATE_LIMIT_MAX` - Requests per window per client (default: 120)
//! - `RATE_LIMIT_WINDOW_SECS` - Rate limit window (default: 60)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Sentry error tracking
//!
//! ## `ParcelPerfect`
//! - `PP_BASE_URL` - Courier RPC endpoint
//! - `PP_TOKEN` - Courier token
//! - `PP_REQUIRE_TOKEN` - Attach `token_id` to generic calls (default: true)
//! - `PP_ACCNUM` - Courier account number
//! - `PP_PLACE_ID` - Place search id (default: `ShopifyScanStation`)
//!
//! ## Shopify
//! - `SHOPIFY_STORE` - Bare shop name or absolute store URL
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token
//! - `SHOPIFY_API_VERSION` - Admin REST version (default: 2024-10)
//! - `SHOPIFY_LOCATION_ID` - Fulfillment location id
//! - `TRACKING_COMPANY` - Default tracking company (default: SWE Couriers)
//!
//! ## `PrintNode`
//! - `PRINTNODE_API_KEY` - API key
//! - `PRINTNODE_PRINTER_ID` - Target printer id
//! - `PRINTNODE_BASE_URL` - API base (default: `https://api.printnode.com`)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_API_VERSION: &str = "2024-10";
const DEFAULT_TRACKING_COMPANY: &str = "SWE Couriers";
const DEFAULT_PLACE_ID: &str = "ShopifyScanStation";
const DEFAULT_PRINTNODE_BASE_URL: &str = "https://api.printnode.com";
const DEFAULT_RATE_LIMIT_MAX: u64 = 120;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Scan station configuration snapshot.
///
/// Built once at startup and shared read-only by every handler.
#[derive(Debug, Clone)]
pub struct ScanStationConfig {
    /// Deployment environment name (`production`, `development`, ...)
    pub environment: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to call the proxy from a browser
    pub allowed_origins: AllowedOrigins,
    /// Directory holding the front-end build
    pub public_dir: PathBuf,
    /// Per-client request limits
    pub rate_limit: RateLimitConfig,
    /// `ParcelPerfect` courier settings
    pub parcel_perfect: ParcelPerfectConfig,
    /// Shopify Admin API settings
    pub shopify: ShopifyConfig,
    /// `PrintNode` settings
    pub printnode: PrintNodeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Ordered, de-duplicated CORS allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parse a comma-separated origin list, dropping blanks and duplicates.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut origins: Vec<String> = Vec::new();
        for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            if !origins.iter().any(|known| known == origin) {
                origins.push(origin.to_string());
            }
        }
        Self(origins)
    }

    /// Whether an `Origin` header value is on the list.
    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|known| known == origin)
    }

    /// Iterate the origins in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Borrow the origins as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client
    pub max_requests: u64,
    /// Window length
    pub window: Duration,
    /// Derive the client key from forwarding headers instead of the socket
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            trust_proxy: false,
        }
    }
}

/// `ParcelPerfect` courier configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ParcelPerfectConfig {
    /// RPC endpoint (e.g., `https://adpdemo.pperfect.com/ecomService/v19/Json/`)
    pub base_url: String,
    /// API token sent as `token_id`
    pub token: SecretString,
    /// Attach the token to generic calls
    pub require_token: bool,
    /// Courier account number
    pub account_number: String,
    /// Place search id
    pub place_id: String,
}

impl std::fmt::Debug for ParcelPerfectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParcelPerfectConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("require_token", &self.require_token)
            .field("account_number", &self.account_number)
            .field("place_id", &self.place_id)
            .finish()
    }
}

impl ParcelPerfectConfig {
    /// Whether a base URL was supplied at all.
    #[must_use]
    pub fn has_base_url(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Whether a courier token was supplied.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Normalized store base URL (e.g., `https://your-store.myshopify.com`)
    pub store: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Admin REST API version (e.g., 2024-10)
    pub api_version: String,
    /// Location to fulfill from
    pub location_id: Option<u64>,
    /// Tracking company used when the request names none
    pub tracking_company: String,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("location_id", &self.location_id)
            .field("tracking_company", &self.tracking_company)
            .finish()
    }
}

impl ShopifyConfig {
    /// Whether both the store and the access token are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.store.is_empty() && !self.access_token.expose_secret().is_empty()
    }

    /// Admin REST base, e.g. `https://shop.myshopify.com/admin/api/2024-10`.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}/admin/api/{}", self.store, self.api_version)
    }
}

/// `PrintNode` configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PrintNodeConfig {
    /// API key, sent as the Basic auth username
    pub api_key: SecretString,
    /// Target printer id
    pub printer_id: String,
    /// API base URL
    pub base_url: String,
}

impl std::fmt::Debug for PrintNodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintNodeConfig")
            .field("api_key", &"[REDACTED]")
            .field("printer_id", &self.printer_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PrintNodeConfig {
    /// Whether both the API key and the printer id are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.printer_id.is_empty()
    }
}

impl ScanStationConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    #[must_use]
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset, so `PORT=` falls back to 3000.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let rate_limit = RateLimitConfig {
            max_requests: env.parse_or("RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX),
            window: Duration::from_secs(
                env.parse_or("RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS),
            ),
            trust_proxy: env.flag_or("TRUST_PROXY", false),
        };

        Self {
            environment: env.or_default("APP_ENV", "development"),
            host: env.parse_or("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: env.parse_or("PORT", DEFAULT_PORT),
            allowed_origins: AllowedOrigins::parse(&env.or_default("FRONTEND_ORIGIN", DEFAULT_ORIGIN)),
            public_dir: PathBuf::from(env.or_default("PUBLIC_DIR", "public")),
            rate_limit,
            parcel_perfect: ParcelPerfectConfig {
                base_url: env.or_default("PP_BASE_URL", ""),
                token: SecretString::from(env.or_default("PP_TOKEN", "")),
                require_token: env.flag_or("PP_REQUIRE_TOKEN", true),
                account_number: env.or_default("PP_ACCNUM", ""),
                place_id: env.or_default("PP_PLACE_ID", DEFAULT_PLACE_ID),
            },
            shopify: ShopifyConfig {
                store: normalize_shopify_store(&env.or_default("SHOPIFY_STORE", "")),
                access_token: SecretString::from(env.or_default("SHOPIFY_ACCESS_TOKEN", "")),
                api_version: env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
                location_id: env.get("SHOPIFY_LOCATION_ID").and_then(|v| v.trim().parse().ok()),
                tracking_company: env.or_default("TRACKING_COMPANY", DEFAULT_TRACKING_COMPANY),
            },
            printnode: PrintNodeConfig {
                api_key: SecretString::from(env.or_default("PRINTNODE_API_KEY", "")),
                printer_id: env.or_default("PRINTNODE_PRINTER_ID", ""),
                base_url: env
                    .or_default("PRINTNODE_BASE_URL", DEFAULT_PRINTNODE_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the proxy runs in production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup that treats empty values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional, non-empty variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to the default when absent or invalid.
    fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Case-insensitive `"true"` check with a default for unset variables.
    fn flag_or(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map_or(default, |value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// Normalize `SHOPIFY_STORE` into a store base URL.
///
/// - `""` stays empty (Shopify unconfigured)
/// - absolute `http(s)://` URLs pass through without a trailing slash
/// - `shop.myshopify.com` gains the `https://` scheme
/// - a bare shop name becomes `https://<name>.myshopify.com`
#[must_use]
pub fn normalize_shopify_store(store: &str) -> String {
    let store = store.trim();
    if store.is_empty() {
        return String::new();
    }
    if store.starts_with("http://") || store.starts_with("https://") {
        return store.strip_suffix('/').unwrap_or(store).to_string();
    }
    if store.ends_with(".myshopify.com") {
        return format!("https://{store}");
    }
    format!("https://{store}.myshopify.com")
}
