//! `ParcelPerfect` courier RPC client.
//!
//! `ParcelPerfect` exposes a class+method RPC convention over HTTP:
//!
//! - Generic calls are `POST`ed form-encoded as `method`, `class`, `params`
//!   (JSON text) and, when required, `token_id`.
//! - Place search is a `GET` with `Class=Waybill&method=getPlace` plus the
//!   token, a JSON `params` object and the free-text `query`.
//!
//! Replies are returned buffered so the proxy can forward them verbatim.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::ParcelPerfectConfig;
use crate::upstream::UpstreamReply;

/// Timeout for courier calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors that can occur when calling `ParcelPerfect`.
#[derive(Debug, Error)]
pub enum ParcelPerfectError {
    /// `PP_BASE_URL` is unset or not an http(s) URL.
    #[error("PP_BASE_URL must be a valid URL")]
    InvalidBaseUrl,

    /// Place search needs a token.
    #[error("PP_TOKEN is required for getPlace")]
    MissingToken,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// One generic courier RPC invocation.
#[derive(Debug, Clone)]
pub struct RpcCall {
    pub method: String,
    pub class: String,
    pub params: Map<String, Value>,
}

/// `ParcelPerfect` API client.
#[derive(Clone)]
pub struct ParcelPerfectClient {
    inner: Arc<ParcelPerfectClientInner>,
}

struct ParcelPerfectClientInner {
    client: reqwest::Client,
    config: ParcelPerfectConfig,
}

impl ParcelPerfectClient {
    /// Create a new client over a shared HTTP connection pool.
    #[must_use]
    pub fn new(config: &ParcelPerfectConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(ParcelPerfectClientInner {
                client,
                config: config.clone(),
            }),
        }
    }

    /// Forward a generic RPC call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBaseUrl` when the endpoint is not configured, or `Http`
    /// if the upstream cannot be reached.
    #[instrument(skip(self, call), fields(class = %call.class, method = %call.method))]
    pub async fn call(&self, call: &RpcCall) -> Result<UpstreamReply, ParcelPerfectError> {
        let endpoint = self.endpoint(&self.inner.config.base_url)?;
        let form = self.call_form(call);

        let response = self
            .inner
            .client
            .post(endpoint)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;

        Ok(UpstreamReply::read(response).await?)
    }

    /// Search courier places (suburbs/towns) by free text.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` or `InvalidBaseUrl` when not configured, or
    /// `Http` if the upstream cannot be reached.
    #[instrument(skip(self))]
    pub async fn get_place(&self, query: &str) -> Result<UpstreamReply, ParcelPerfectError> {
        let config = &self.inner.config;
        if !config.has_token() {
            return Err(ParcelPerfectError::MissingToken);
        }

        let base = &config.base_url;
        let base = if base.ends_with('/') {
            base.clone()
        } else {
            format!("{base}/")
        };
        let endpoint = self.endpoint(&base)?;

        let params = json!({
            "id": config.place_id,
            "accnum": config.account_number,
            "ppcust": "",
        })
        .to_string();

        let response = self
            .inner
            .client
            .get(endpoint)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("Class", "Waybill"),
                ("method", "getPlace"),
                ("token_id", config.token.expose_secret()),
                ("params", params.as_str()),
                ("query", query),
            ])
            .send()
            .await?;

        Ok(UpstreamReply::read(response).await?)
    }

    /// Form fields for a generic call.
    fn call_form(&self, call: &RpcCall) -> Vec<(&'static str, String)> {
        let config = &self.inner.config;
        let mut form = vec![
            ("method", call.method.clone()),
            ("class", call.class.clone()),
            ("params", Value::Object(call.params.clone()).to_string()),
        ];

        if config.require_token && config.has_token() {
            form.push(("token_id", config.token.expose_secret().to_string()));
        }

        form
    }

    /// Validate the configured endpoint.
    fn endpoint(&self, raw: &str) -> Result<Url, ParcelPerfectError> {
        if !self.inner.config.has_base_url() {
            return Err(ParcelPerfectError::InvalidBaseUrl);
        }

        let url = Url::parse(raw).map_err(|_| ParcelPerfectError::InvalidBaseUrl)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ParcelPerfectError::InvalidBaseUrl),
        }
    }
}
