//! Shopify route handlers.
//!
//! Every handler checks that Shopify is configured before looking at its
//! input, so an unconfigured station answers 501 regardless of the request.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use scan_station_core::OrderName;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::shopify::ShopifyError;
use crate::shopify::payloads;
use crate::shopify::types::{DraftOrderRequest, FulfillRequest, OrderLookup};
use crate::state::AppState;

/// `GET /shopify/customers/search` query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Look up an order by its display name (`#1234` or `1234`).
#[instrument(skip(state))]
pub async fn order_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<OrderLookup>> {
    let shopify = state.shopify()?;
    let name = OrderName::normalize(&name);

    let order = shopify
        .find_order_by_name(&name)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let customer_place_code = shopify.order_customer_place_code(&order).await;

    Ok(Json(OrderLookup {
        order,
        customer_place_code,
    }))
}

/// List open (unfulfilled or in-progress) orders.
#[instrument(skip(state))]
pub async fn open_orders(State(state): State<AppState>) -> Result<Json<Value>> {
    let orders = state.shopify()?.open_orders().await?;
    Ok(Json(json!({ "orders": orders })))
}

/// Search customers by free text.
#[instrument(skip(state))]
pub async fn search_customers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let shopify = state.shopify()?;

    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::bad_request(
            "Missing ?q= query string for customer search",
            None,
        ));
    }

    let customers = shopify.search_customers(term).await?;
    Ok(Json(json!({ "customers": customers })))
}

/// Create a draft order for a customer.
///
/// Validation failures echo the submitted body back as `detail`.
#[instrument(skip(state, body))]
pub async fn create_draft_order(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    let shopify = state.shopify()?;

    if !is_truthy(body.get("customerId")) {
        return Err(AppError::bad_request("Missing customerId", Some(body)));
    }
    if !body
        .get("lineItems")
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
    {
        return Err(AppError::bad_request("No lineItems supplied", Some(body)));
    }

    let request: DraftOrderRequest = serde_json::from_value(body.clone()).map_err(|e| {
        AppError::bad_request(format!("Invalid draft order: {e}"), Some(body.clone()))
    })?;
    let Some(customer_id) = request.customer_id else {
        return Err(AppError::bad_request("Missing customerId", Some(body)));
    };

    let payload = payloads::draft_order(customer_id, &request);
    let draft_order = shopify.create_draft_order(&payload).await?;

    Ok(Json(json!({ "ok": true, "draftOrder": draft_order })))
}

/// Fulfill an order (or some of its lines) with tracking details.
#[instrument(skip(state, body))]
pub async fn fulfill(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>> {
    let shopify = state.shopify()?;
    let missing_fields =
        || AppError::MissingFields("orderId and trackingNumber are required".to_string());

    if !is_truthy(body.get("orderId")) || !is_truthy(body.get("trackingNumber")) {
        return Err(missing_fields());
    }

    let request: FulfillRequest = serde_json::from_value(body.clone()).map_err(|e| {
        AppError::bad_request(format!("Invalid fulfillment: {e}"), Some(body.clone()))
    })?;
    let (target, payload) =
        payloads::fulfillment(&request, shopify.location_id(), shopify.tracking_company())
            .ok_or_else(missing_fields)?;

    let fulfillment = shopify
        .create_fulfillment(target.order_id, &payload)
        .await
        .map_err(|e| match e {
            ShopifyError::Api { status, body, .. } => AppError::ShopifyRejected {
                status,
                detail: body,
            },
            other => other.into(),
        })?;

    Ok(Json(json!({ "ok": true, "fulfillment": fulfillment })))
}

/// JSON truthiness: absent, `null`, `false`, `0` and `""` are all missing.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
