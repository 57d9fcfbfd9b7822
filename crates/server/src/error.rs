//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Each variant renders one of
//! the JSON envelopes the scan station UI understands, always with a
//! machine-readable `error` code. Server-side failures are logged and
//! captured to Sentry before responding.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::parcel_perfect::ParcelPerfectError;
use crate::printnode::PrintNodeError;
use crate::shopify::ShopifyError;

/// Application-level error type for the scan station.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed client input.
    #[error("Bad request: {message}")]
    BadRequest {
        status: StatusCode,
        message: String,
        detail: Option<Value>,
    },

    /// An upstream is not configured (reported as 501).
    #[error("Not configured: {0}")]
    Config(String),

    /// An upstream is configured with an unusable value (reported as 500).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream answered with a non-success status.
    #[error("Upstream error: {status}")]
    Upstream {
        status: StatusCode,
        status_text: String,
        body: Value,
    },

    /// `PrintNode` answered with a non-success status.
    #[error("PrintNode error: {status}")]
    PrintNodeUpstream {
        status: StatusCode,
        status_text: String,
        body: Value,
    },

    /// Upstream could not be reached or its reply could not be read.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// Fulfillment request lacks required fields.
    #[error("Missing fields: {0}")]
    MissingFields(String),

    /// Shopify rejected a fulfillment.
    #[error("Shopify rejected fulfillment: {status}")]
    ShopifyRejected { status: StatusCode, detail: Value },

    /// Browser origin is not on the allow-list.
    #[error("Origin {origin} is not allowed by CORS")]
    CorsRejected {
        origin: String,
        allowed_origins: Vec<String>,
    },

    /// Client exceeded the request budget for the current window.
    #[error("Rate limited")]
    RateLimited { retry_after_secs: u64 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 400 `BAD_REQUEST` with an optional echo of the offending input.
    pub fn bad_request(message: impl Into<String>, detail: Option<Value>) -> Self {
        Self::BadRequest {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail,
        }
    }

    /// 501 `CONFIG_ERROR`.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// `UPSTREAM_ERROR` mirroring the upstream status.
    pub fn upstream(status: StatusCode, status_text: impl Into<String>, body: Value) -> Self {
        Self::Upstream {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { status, .. } => *status,
            Self::Config(_) => StatusCode::NOT_IMPLEMENTED,
            Self::InvalidConfig(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. }
            | Self::PrintNodeUpstream { status, .. }
            | Self::ShopifyRejected { status, .. } => *status,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::CorsRejected { .. } => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::BadRequest {
                message, detail, ..
            } => {
                let mut body = json!({ "error": "BAD_REQUEST", "message": message });
                if let Some(detail) = detail {
                    body["detail"] = detail.clone();
                }
                body
            }
            Self::Config(message) | Self::InvalidConfig(message) => {
                json!({ "error": "CONFIG_ERROR", "message": message })
            }
            Self::NotFound(message) => json!({ "error": "NOT_FOUND", "message": message }),
            Self::Upstream {
                status,
                status_text,
                body,
            } => json!({
                "error": "UPSTREAM_ERROR",
                "status": status.as_u16(),
                "statusText": status_text,
                "body": body,
            }),
            Self::PrintNodeUpstream {
                status,
                status_text,
                body,
            } => json!({
                "error": "PRINTNODE_UPSTREAM",
                "status": status.as_u16(),
                "statusText": status_text,
                "body": body,
            }),
            Self::Transport(message) => json!({ "error": "UPSTREAM_ERROR", "message": message }),
            Self::MissingFields(message) => json!({
                "ok": false,
                "error": "MISSING_FIELDS",
                "message": message,
            }),
            Self::ShopifyRejected { status, detail } => json!({
                "ok": false,
                "status": status.as_u16(),
                "error": "SHOPIFY_ERROR",
                "detail": detail,
            }),
            Self::CorsRejected {
                allowed_origins, ..
            } => json!({
                "error": "CORS_ERROR",
                "message": self.to_string(),
                "allowedOrigins": allowed_origins,
            }),
            Self::RateLimited { .. } => json!({
                "error": "RATE_LIMITED",
                "message": "Too many requests, please try again later.",
            }),
            Self::Internal(message) => json!({ "error": "SERVER_ERROR", "message": message }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Transport(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (self.status(), Json(self.body())).into_response();

        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

impl From<ShopifyError> for AppError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Api {
                status,
                status_text,
                body,
            } => Self::upstream(status, status_text, body),
            ShopifyError::Http(e) => Self::Transport(e.to_string()),
            ShopifyError::Parse(message) => Self::Transport(message),
        }
    }
}

impl From<ParcelPerfectError> for AppError {
    fn from(err: ParcelPerfectError) -> Self {
        match err {
            ParcelPerfectError::InvalidBaseUrl | ParcelPerfectError::MissingToken => {
                Self::InvalidConfig(err.to_string())
            }
            ParcelPerfectError::Http(e) => Self::Transport(e.to_string()),
        }
    }
}

impl From<PrintNodeError> for AppError {
    fn from(err: PrintNodeError) -> Self {
        match err {
            PrintNodeError::Api {
                status,
                status_text,
                body,
            } => Self::PrintNodeUpstream {
                status,
                status_text,
                body,
            },
            PrintNodeError::Http(e) => Self::Transport(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
            detail: None,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
