//! Buffered upstream replies.
//!
//! Every upstream call in the proxy reads the whole body as text first, then
//! decides whether to treat it as JSON. Upstreams occasionally answer with
//! HTML error pages, so nothing assumes the body parses.

use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};

/// Status, content type and body text of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

impl UpstreamReply {
    /// Buffer a `reqwest` response.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the body cannot be read.
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = response.text().await?;

        Ok(Self {
            status,
            content_type,
            text,
        })
    }

    /// Whether the upstream reported success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase for the status, e.g. `Not Found`.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.status.canonical_reason().unwrap_or_default().to_string()
    }

    /// Parse the body as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }

    /// Parse the body as JSON, wrapping non-JSON text as `{"raw": text}`.
    #[must_use]
    pub fn json_or_raw(&self) -> Value {
        self.json().unwrap_or_else(|| json!({ "raw": self.text }))
    }

    /// Leading part of the body for log lines.
    #[must_use]
    pub fn snippet(&self, max_chars: usize) -> &str {
        self.text
            .char_indices()
            .nth(max_chars)
            .map_or(self.text.as_str(), |(idx, _)| &self.text[..idx])
    }
}
