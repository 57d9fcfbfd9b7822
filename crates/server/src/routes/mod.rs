//! HTTP route handlers for the scan station proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /healthz                        - Liveness probe
//!
//! # ParcelPerfect
//! POST /pp                             - Generic class+method RPC call
//! GET  /pp/place?q=                    - Place (suburb/town) search
//!
//! # Shopify
//! GET  /shopify/orders/by-name/{name}  - Order lookup with courier place code
//! GET  /shopify/orders/open            - Unfulfilled orders for packing
//! GET  /shopify/customers/search?q=    - Customer search
//! POST /shopify/draft-orders           - Create a draft order
//! POST /shopify/fulfill                - Fulfill an order with tracking
//!
//! # PrintNode
//! POST /printnode/print                - Submit a PDF label
//! ```

pub mod parcel_perfect;
pub mod printnode;
pub mod shopify;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Create the `ParcelPerfect` routes router.
pub fn parcel_perfect_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(parcel_perfect::call))
        .route("/place", get(parcel_perfect::place))
}

/// Create the Shopify routes router.
pub fn shopify_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/by-name/{name}", get(shopify::order_by_name))
        .route("/orders/open", get(shopify::open_orders))
        .route("/customers/search", get(shopify::search_customers))
        .route("/draft-orders", post(shopify::create_draft_order))
        .route("/fulfill", post(shopify::fulfill))
}

/// Create the `PrintNode` routes router.
pub fn printnode_routes() -> Router<AppState> {
    Router::new().route("/print", post(printnode::print))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/pp", parcel_perfect_routes())
        .nest("/shopify", shopify_routes())
        .nest("/printnode", printnode_routes())
}

/// Liveness probe.
async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}
