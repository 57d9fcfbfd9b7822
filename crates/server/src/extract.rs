//! Request extractors with JSON error envelopes.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as `BAD_REQUEST` envelopes.
///
/// Malformed JSON, a missing `Content-Type` and oversized bodies keep the
/// status axum picked (400, 415, 413) but answer in the same shape as every
/// other client error.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
