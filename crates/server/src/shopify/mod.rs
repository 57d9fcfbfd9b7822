//! Shopify Admin REST API client.
//!
//! # Architecture
//!
//! - `types` - REST payloads read from Shopify and the reduced UI shapes
//! - `conversions` - REST records → UI rows (order summaries, customers)
//! - `payloads` - UI requests → draft order and fulfillment bodies
//!
//! # Authentication
//!
//! Every request carries the private Admin API token in
//! `X-Shopify-Access-Token`. The token never leaves the server.

pub mod conversions;
pub mod payloads;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use scan_station_core::{CustomerId, OrderId, OrderName};

use crate::config::ShopifyConfig;
use crate::upstream::UpstreamReply;

use payloads::{DraftOrderEnvelope, FulfillmentEnvelope};
use types::{
    CustomerSummary, DraftOrderSummary, OrderSummary, RestCustomerList, RestDraftOrder,
    RestMetafieldList, RestOrder, RestOrderList,
};

/// Timeout for Shopify calls on the request path.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Timeout for best-effort enrichment lookups.
const ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(15);
/// Page size for the open-orders board.
const OPEN_ORDERS_LIMIT: &str = "50";
/// Page size for customer search.
const CUSTOMER_SEARCH_LIMIT: &str = "10";

/// Access token header name.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors that can occur when interacting with the Shopify API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status}")]
    Api {
        status: StatusCode,
        status_text: String,
        body: Value,
    },

    /// A success response could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ShopifyError {
    /// Build an `Api` error carrying the raw body text.
    fn api_text(reply: &UpstreamReply) -> Self {
        Self::Api {
            status: reply.status,
            status_text: reply.status_text(),
            body: Value::String(reply.text.clone()),
        }
    }

    /// Build an `Api` error carrying the parsed (or wrapped raw) body.
    fn api_json(reply: &UpstreamReply) -> Self {
        Self::Api {
            status: reply.status,
            status_text: reply.status_text(),
            body: reply.json_or_raw(),
        }
    }
}

/// Shopify Admin REST client.
///
/// Only constructed when the store and access token are configured.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    config: ShopifyConfig,
    api_base: String,
    token: HeaderValue,
}

impl ShopifyClient {
    /// Create a client, or `None` if the store or token is missing.
    #[must_use]
    pub fn from_config(config: &ShopifyConfig, client: reqwest::Client) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }

        let mut token = HeaderValue::from_str(config.access_token.expose_secret()).ok()?;
        token.set_sensitive(true);

        Some(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                config: config.clone(),
                api_base: config.api_base(),
                token,
            }),
        })
    }

    /// Store base URL (e.g., `https://shop.myshopify.com`).
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.config.store
    }

    /// Configured fulfillment location.
    #[must_use]
    pub fn location_id(&self) -> Option<u64> {
        self.inner.config.location_id
    }

    /// Tracking company used when a request names none.
    #[must_use]
    pub fn tracking_company(&self) -> &str {
        &self.inner.config.tracking_company
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Find an order by its display name across all statuses.
    ///
    /// Returns the raw Shopify order so the UI sees every field.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Api` on a non-success status and `Http` or
    /// `Parse` on transport failures.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn find_order_by_name(&self, name: &OrderName) -> Result<Option<Value>, ShopifyError> {
        let reply = self
            .get("/orders.json", &[("status", "any"), ("name", name.as_str())], REQUEST_TIMEOUT)
            .await?;

        if !reply.is_success() {
            return Err(ShopifyError::api_text(&reply));
        }

        let list: RestOrderList<Value> = parse(&reply)?;
        Ok(list.orders.into_iter().next())
    }

    /// Courier place code stored on an order's customer.
    ///
    /// Best effort: failures are logged and yield `None`.
    #[instrument(skip(self, order))]
    pub async fn order_customer_place_code(&self, order: &Value) -> Option<Value> {
        let customer_id: CustomerId = order
            .get("customer")
            .and_then(|c| c.get("id"))
            .and_then(|id| serde_json::from_value(id.clone()).ok())?;

        match self.customer_place_code(customer_id).await {
            Ok(code) => code,
            Err(ShopifyError::Api { status, body, .. }) => {
                tracing::warn!(%customer_id, %status, %body, "Customer metafields fetch failed");
                None
            }
            Err(e) => {
                tracing::warn!(%customer_id, error = %e, "Customer metafields error");
                None
            }
        }
    }

    /// Read `custom.parcelperfect_place_code` from a customer's metafields.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the metafields cannot be fetched.
    pub async fn customer_place_code(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Value>, ShopifyError> {
        let path = format!("/customers/{customer_id}/metafields.json");
        let reply = self.get(&path, &[], ENRICHMENT_TIMEOUT).await?;

        if !reply.is_success() {
            return Err(ShopifyError::api_text(&reply));
        }

        let list: RestMetafieldList = parse(&reply)?;
        Ok(conversions::place_code(list.metafields))
    }

    /// Up to 50 unfulfilled or in-progress orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on upstream or transport failure.
    #[instrument(skip(self))]
    pub async fn open_orders(&self) -> Result<Vec<OrderSummary>, ShopifyError> {
        let reply = self
            .get(
                "/orders.json",
                &[
                    ("status", "any"),
                    ("fulfillment_status", "unfulfilled,in_progress"),
                    ("limit", OPEN_ORDERS_LIMIT),
                    ("order", "created_at desc"),
                ],
                REQUEST_TIMEOUT,
            )
            .await?;

        if !reply.is_success() {
            return Err(ShopifyError::api_text(&reply));
        }

        let list: RestOrderList<RestOrder> = parse(&reply)?;
        Ok(list
            .orders
            .into_iter()
            .map(conversions::order_summary)
            .collect())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Search customers by free text (name, email, phone, company).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on upstream or transport failure.
    #[instrument(skip(self))]
    pub async fn search_customers(&self, query: &str) -> Result<Vec<CustomerSummary>, ShopifyError> {
        let reply = self
            .get(
                "/customers/search.json",
                &[("query", query), ("limit", CUSTOMER_SEARCH_LIMIT)],
                REQUEST_TIMEOUT,
            )
            .await?;

        if !reply.is_success() {
            return Err(ShopifyError::api_json(&reply));
        }

        let list: RestCustomerList = parse(&reply)?;
        Ok(list
            .customers
            .into_iter()
            .map(conversions::customer_summary)
            .collect())
    }

    // =========================================================================
    // Draft orders & fulfillment
    // =========================================================================

    /// Create a draft order.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` on upstream or transport failure.
    #[instrument(skip(self, payload))]
    pub async fn create_draft_order(
        &self,
        payload: &DraftOrderEnvelope,
    ) -> Result<DraftOrderSummary, ShopifyError> {
        let reply = self.post("/draft_orders.json", payload).await?;

        if !reply.is_success() {
            tracing::error!(
                status = %reply.status,
                body = %reply.snippet(400),
                "Draft order error"
            );
            return Err(ShopifyError::api_json(&reply));
        }

        let data = reply.json_or_raw();
        let draft = data.get("draft_order").unwrap_or(&data);
        let draft: RestDraftOrder = serde_json::from_value(draft.clone())
            .map_err(|e| ShopifyError::Parse(e.to_string()))?;

        Ok(conversions::draft_order_summary(draft, self.store()))
    }

    /// Create a fulfillment with tracking details.
    ///
    /// Returns the created fulfillment (or the whole body if Shopify did not
    /// wrap it).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Api` with the parsed body on a non-success
    /// status, or `Http` on transport failure.
    #[instrument(skip(self, payload), fields(order_id = %order_id))]
    pub async fn create_fulfillment(
        &self,
        order_id: OrderId,
        payload: &FulfillmentEnvelope,
    ) -> Result<Value, ShopifyError> {
        let path = format!("/orders/{order_id}/fulfillments.json");
        let reply = self.post(&path, payload).await?;

        tracing::info!(
            status = %reply.status,
            body = %reply.snippet(400),
            "Shopify fulfill POST"
        );

        let mut data = reply.json_or_raw();
        if !reply.is_success() {
            return Err(ShopifyError::Api {
                status: reply.status,
                status_text: reply.status_text(),
                body: data,
            });
        }

        Ok(match data.get_mut("fulfillment") {
            Some(fulfillment) if !fulfillment.is_null() => fulfillment.take(),
            _ => data,
        })
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn request(&self, method: reqwest::Method, path: &str, timeout: Duration) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.inner.api_base);
        self.inner
            .client
            .request(method, url)
            .timeout(timeout)
            .header(ACCESS_TOKEN_HEADER, self.inner.token.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<UpstreamReply, ShopifyError> {
        let response = self
            .request(reqwest::Method::GET, path, timeout)
            .query(query)
            .send()
            .await?;
        Ok(UpstreamReply::read(response).await?)
    }

    async fn post<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<UpstreamReply, ShopifyError> {
        let response = self
            .request(reqwest::Method::POST, path, REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;
        Ok(UpstreamReply::read(response).await?)
    }
}

/// Parse a success body.
fn parse<T: DeserializeOwned>(reply: &UpstreamReply) -> Result<T, ShopifyError> {
    serde_json::from_str(&reply.text).map_err(|e| ShopifyError::Parse(e.to_string()))
}
