//! Shopify Admin REST shapes and the reduced shapes returned to the UI.
//!
//! Inbound (`Rest*`) structs only name the fields the scan station reads;
//! everything else in Shopify's payload is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scan_station_core::{
    CustomerId, DeliveryMethod, DraftOrderId, LineItemId, LooseString, OrderId, Price, Quantity,
    TagList, VariantId,
};

// =============================================================================
// Shopify REST payloads (inbound)
// =============================================================================

/// `GET /orders.json` envelope.
#[derive(Debug, Deserialize)]
pub struct RestOrderList<T> {
    #[serde(default = "Vec::new")]
    pub orders: Vec<T>,
}

/// Order as listed for the open-orders board.
#[derive(Debug, Deserialize)]
pub struct RestOrder {
    pub id: OrderId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<RestShippingAddress>,
    #[serde(default)]
    pub customer: Option<RestCustomerName>,
    #[serde(default)]
    pub line_items: Option<Vec<RestLineItem>>,
}

/// Subset of an order's shipping address.
#[derive(Debug, Default, Deserialize)]
pub struct RestShippingAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Customer name fields embedded in an order.
#[derive(Debug, Default, Deserialize)]
pub struct RestCustomerName {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Order line item.
#[derive(Debug, Deserialize)]
pub struct RestLineItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// `GET /customers/search.json` envelope.
#[derive(Debug, Deserialize)]
pub struct RestCustomerList {
    #[serde(default)]
    pub customers: Vec<RestCustomer>,
}

/// Customer search hit.
#[derive(Debug, Deserialize)]
pub struct RestCustomer {
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tags: TagList,
    #[serde(default)]
    pub default_address: Option<Value>,
    #[serde(default)]
    pub addresses: Option<Vec<Value>>,
}

/// `GET /customers/{id}/metafields.json` envelope.
#[derive(Debug, Deserialize)]
pub struct RestMetafieldList {
    #[serde(default)]
    pub metafields: Vec<RestMetafield>,
}

/// A customer metafield.
#[derive(Debug, Deserialize)]
pub struct RestMetafield {
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Draft order as returned by `POST /draft_orders.json`.
#[derive(Debug, Deserialize)]
pub struct RestDraftOrder {
    #[serde(default)]
    pub id: Option<DraftOrderId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub subtotal_price: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
}

// =============================================================================
// UI requests
// =============================================================================

/// `POST /shopify/draft-orders` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderRequest {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub shipping_address: Option<Value>,
    #[serde(default)]
    pub billing_address: Option<Value>,
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub po_number: Option<LooseString>,
    #[serde(default)]
    pub line_items: Option<Vec<DraftLineItemRequest>>,
    #[serde(default)]
    pub shipping_price: Option<Price>,
    #[serde(default)]
    pub shipping_service: Option<String>,
}

/// Line item in a draft order request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItemRequest {
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

/// `POST /shopify/fulfill` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequest {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub line_items: Option<Vec<FulfillLineItemRequest>>,
    #[serde(default)]
    pub tracking_number: Option<LooseString>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub tracking_company: Option<String>,
}

/// Line item subset to fulfill.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillLineItemRequest {
    pub id: LineItemId,
    #[serde(default)]
    pub quantity: Option<Quantity>,
}

// =============================================================================
// UI responses
// =============================================================================

/// Open order row for the packing board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub name: Option<String>,
    pub customer_name: String,
    pub created_at: Option<String>,
    pub fulfillment_status: Option<String>,
    pub shipping_city: String,
    pub shipping_postal: String,
    pub parcel_count: Option<u64>,
    pub line_items: Vec<LineItemSummary>,
}

/// Title and quantity of an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemSummary {
    pub title: Option<String>,
    pub quantity: Option<u32>,
}

/// Customer search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub delivery_method: Option<DeliveryMethod>,
    pub default_address: Option<Value>,
    pub addresses: Vec<Value>,
}

/// Created draft order, reduced for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DraftOrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub invoice_url: Option<String>,
    pub admin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<String>,
}

/// Order found by name, with the customer's courier place code if known.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLookup {
    pub order: Value,
    pub customer_place_code: Option<Value>,
}
