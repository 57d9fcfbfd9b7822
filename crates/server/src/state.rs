//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ScanStationConfig;
use crate::error::AppError;
use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::parcel_perfect::ParcelPerfectClient;
use crate::printnode::PrintNodeClient;
use crate::shopify::ShopifyClient;

/// User agent sent to every upstream.
const USER_AGENT: &str = concat!("scan-station/", env!("CARGO_PKG_VERSION"));

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds the read-only
/// configuration snapshot and one client per upstream; clients for
/// unconfigured upstreams are absent.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ScanStationConfig,
    parcel_perfect: ParcelPerfectClient,
    shopify: Option<ShopifyClient>,
    printnode: Option<PrintNodeClient>,
    rate_limiter: FixedWindowLimiter,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(config: ScanStationConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let parcel_perfect = ParcelPerfectClient::new(&config.parcel_perfect, http.clone());
        let shopify = ShopifyClient::from_config(&config.shopify, http.clone());
        let printnode = PrintNodeClient::from_config(&config.printnode, http);
        let rate_limiter = FixedWindowLimiter::new(&config.rate_limit);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                parcel_perfect,
                shopify,
                printnode,
                rate_limiter,
            }),
        })
    }

    /// Get a reference to the configuration snapshot.
    #[must_use]
    pub fn config(&self) -> &ScanStationConfig {
        &self.inner.config
    }

    /// Get the `ParcelPerfect` client.
    ///
    /// Endpoint and token checks happen per call because the two courier
    /// operations need different settings.
    #[must_use]
    pub fn parcel_perfect(&self) -> &ParcelPerfectClient {
        &self.inner.parcel_perfect
    }

    /// Get the Shopify client, or a 501 `CONFIG_ERROR`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the store or access token is missing.
    pub fn shopify(&self) -> Result<&ShopifyClient, AppError> {
        self.inner
            .shopify
            .as_ref()
            .ok_or_else(|| AppError::config("Set SHOPIFY_STORE and SHOPIFY_ACCESS_TOKEN in .env"))
    }

    /// Get the `PrintNode` client, or a 501 `CONFIG_ERROR`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the API key or printer id is missing.
    pub fn printnode(&self) -> Result<&PrintNodeClient, AppError> {
        self.inner.printnode.as_ref().ok_or_else(|| {
            AppError::config("Set PRINTNODE_API_KEY and PRINTNODE_PRINTER_ID in your .env file")
        })
    }

    /// Get the request rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &FixedWindowLimiter {
        &self.inner.rate_limiter
    }
}
