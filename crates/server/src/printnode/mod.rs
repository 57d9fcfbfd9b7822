//! `PrintNode` print-job client.
//!
//! Labels are rendered to PDF in the browser and submitted here as base64.
//! `PrintNode` authenticates with HTTP Basic: the API key as username and an
//! empty password.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::config::PrintNodeConfig;
use crate::upstream::UpstreamReply;

/// Timeout for print job submission.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Title used when the UI does not name the job.
pub const DEFAULT_TITLE: &str = "Parcel Label";
/// Source label shown in the `PrintNode` dashboard.
pub const JOB_SOURCE: &str = "Flippen Lekka Scan Station";

/// Errors that can occur when submitting print jobs.
#[derive(Debug, Error)]
pub enum PrintNodeError {
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
}

/// `POST /printjobs` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub printer_id: Option<u64>,
    pub title: String,
    pub content_type: &'static str,
    pub content: String,
    pub source: &'static str,
}

impl PrintJob {
    /// Build a PDF job, stripping whitespace (line wraps) from the payload.
    #[must_use]
    pub fn pdf(printer_id: &str, title: Option<&str>, pdf_base64: &str) -> Self {
        Self {
            printer_id: printer_id.trim().parse().ok(),
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            content_type: "pdf_base64",
            content: pdf_base64.chars().filter(|c| !c.is_whitespace()).collect(),
            source: JOB_SOURCE,
        }
    }
}

/// `PrintNode` API client.
///
/// Only constructed when the API key and printer id are configured.
#[derive(Clone)]
pub struct PrintNodeClient {
    inner: Arc<PrintNodeClientInner>,
}

struct PrintNodeClientInner {
    client: reqwest::Client,
    base_url: String,
    printer_id: String,
    authorization: HeaderValue,
}

impl PrintNodeClient {
    /// Create a client, or `None` if the API key or printer id is missing.
    #[must_use]
    pub fn from_config(config: &PrintNodeConfig, client: reqwest::Client) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }

        let credentials = STANDARD.encode(format!("{}:", config.api_key.expose_secret()));
        let mut authorization = HeaderValue::from_str(&format!("Basic {credentials}")).ok()?;
        authorization.set_sensitive(true);

        Some(Self {
            inner: Arc::new(PrintNodeClientInner {
                client,
                base_url: config.base_url.clone(),
                printer_id: config.printer_id.clone(),
                authorization,
            }),
        })
    }

    /// Configured printer id.
    #[must_use]
    pub fn printer_id(&self) -> &str {
        &self.inner.printer_id
    }

    /// Submit a print job.
    ///
    /// Returns `PrintNode`'s response body (the new print job id).
    ///
    /// # Errors
    ///
    /// Returns `PrintNodeError::Api` with the parsed (or raw-wrapped) body on a
    /// non-success status, or `Http` on transport failure.
    #[instrument(skip(self, job), fields(printer_id = ?job.printer_id, title = %job.title))]
    pub async fn submit(&self, job: &PrintJob) -> Result<Value, PrintNodeError> {
        let url = format!("{}/printjobs", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .header(AUTHORIZATION, self.inner.authorization.clone())
            .json(job)
            .send()
            .await?;

        let reply = UpstreamReply::read(response).await?;
        let data = reply.json_or_raw();

        if !reply.is_success() {
            tracing::error!(
                status = %reply.status,
                body = %reply.text,
                "PrintNode error"
            );
            return Err(PrintNodeError::Api {
                status: reply.status,
                status_text: reply.status_text(),
                body: data,
            });
        }

        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_print_job_strips_whitespace_and_defaults_title() {
        let job = PrintJob::pdf("71234", None, "JVBER\n  i0xLjQK\r\n");

        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({
                "printerId": 71234,
                "title": "Parcel Label",
                "contentType": "pdf_base64",
                "content": "JVBERi0xLjQK",
                "source": "Flippen Lekka Scan Station"
            })
        );
    }

    #[test]
    fn test_print_job_keeps_title() {
        let job = PrintJob::pdf("71234", Some("Waybill WB1"), "AAAA");
        assert_eq!(job.title, "Waybill WB1");
    }

    #[test]
    fn test_client_requires_key_and_printer() {
        let http = reqwest::Client::new();
        let config = |key: &str, printer: &str| PrintNodeConfig {
            api_key: SecretString::from(key),
            printer_id: printer.to_string(),
            base_url: "https://api.printnode.com".to_string(),
        };

        assert!(PrintNodeClient::from_config(&config("", "1"), http.clone()).is_none());
        assert!(PrintNodeClient::from_config(&config("key", ""), http.clone()).is_none());

        let client = PrintNodeClient::from_config(&config("key", "1"), http).unwrap();
        assert_eq!(client.printer_id(), "1");
        // base64("key:")
        assert_eq!(client.inner.authorization, "Basic a2V5Og==");
    }
}
