//! `PrintNode` route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::printnode::PrintJob;
use crate::state::AppState;

/// `POST /printnode/print` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(default)]
    pub pdf_base64: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Send a base64 PDF label to the configured printer.
#[instrument(skip_all)]
pub async fn print(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PrintRequest>,
) -> Result<Json<Value>> {
    let Some(pdf_base64) = request.pdf_base64.as_deref().filter(|b| !b.is_empty()) else {
        return Err(AppError::bad_request("Missing pdfBase64", None));
    };

    let printnode = state.printnode()?;
    let job = PrintJob::pdf(printnode.printer_id(), request.title.as_deref(), pdf_base64);
    let print_job = printnode.submit(&job).await?;

    Ok(Json(json!({ "ok": true, "printJob": print_job })))
}
