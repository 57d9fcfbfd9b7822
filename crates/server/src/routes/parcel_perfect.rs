//! `ParcelPerfect` route handlers.
//!
//! Both handlers forward the courier's reply as-is: same status, and the
//! body re-emitted as JSON when it parses, else as the original text.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use scan_station_core::LooseString;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::parcel_perfect::RpcCall;
use crate::state::AppState;
use crate::upstream::UpstreamReply;

/// Content type used when the courier does not send one.
const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Content type for non-JSON place search replies.
const TEXT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// `POST /pp` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(default)]
    pub method: Option<LooseString>,
    #[serde(default)]
    pub class_val: Option<LooseString>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl CallRequest {
    /// Validate into an RPC call; `None` if any field is missing.
    ///
    /// `params` must be a JSON object: `null` and arrays are rejected.
    fn into_call(self) -> Option<RpcCall> {
        let method = self.method.filter(|m| !m.is_blank())?;
        let class = self.class_val.filter(|c| !c.is_blank())?;
        let Some(Value::Object(params)) = self.params else {
            return None;
        };

        Some(RpcCall {
            method: method.to_string(),
            class: class.to_string(),
            params,
        })
    }
}

/// `GET /pp/place` query.
#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub q: Option<String>,
    pub query: Option<String>,
}

impl PlaceQuery {
    /// Trimmed search term from `q`, falling back to `query`.
    fn term(&self) -> &str {
        self.q
            .as_deref()
            .filter(|q| !q.is_empty())
            .or(self.query.as_deref())
            .unwrap_or_default()
            .trim()
    }
}

/// Forward a generic class+method call.
#[instrument(skip(state, body))]
pub async fn call(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CallRequest>,
) -> Result<Response> {
    let call = body
        .into_call()
        .ok_or_else(|| AppError::bad_request("Expected { method, classVal, params } in body", None))?;

    let reply = state.parcel_perfect().call(&call).await?;
    let content_type = reply
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let body = match reply.json() {
        Some(json) => json.to_string(),
        None => reply.text,
    };

    Ok((reply.status, [(CONTENT_TYPE, content_type)], body).into_response())
}

/// Search courier places by free text.
#[instrument(skip(state))]
pub async fn place(
    State(state): State<AppState>,
    Query(query): Query<PlaceQuery>,
) -> Result<Response> {
    let term = query.term();
    if term.is_empty() {
        return Err(AppError::bad_request(
            "Missing ?q= query string for place search",
            None,
        ));
    }

    let reply = state.parcel_perfect().get_place(term).await?;
    Ok(passthrough_json(reply))
}

/// JSON when the body parses, otherwise the raw text, at the upstream status.
fn passthrough_json(reply: UpstreamReply) -> Response {
    match reply.json() {
        Some(json) => (reply.status, Json(json)).into_response(),
        None => {
            tracing::warn!(status = %reply.status, "Place search reply is not JSON");
            (
                reply.status,
                [(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))],
                reply.text,
            )
                .into_response()
        }
    }
}
