//! Outbound Shopify REST payloads built from UI requests.

use serde::Serialize;
use serde_json::Value;

use scan_station_core::{
    CustomerId, LineItemId, LooseString, OrderId, Price, Quantity, VariantId,
};

use super::types::{DraftOrderRequest, FulfillRequest};

/// Tag applied to every draft order created from the scan station.
pub const DRAFT_ORDER_TAG: &str = "FLOCS";
/// Metafield namespace for draft order annotations.
pub const DRAFT_METAFIELD_NAMESPACE: &str = "flocs";
/// Shipping method that triggers a courier shipping line.
pub const SHIP_METHOD: &str = "ship";

/// `POST /draft_orders.json` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOrderEnvelope {
    pub draft_order: DraftOrderPayload,
}

/// Draft order fields sent to Shopify.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOrderPayload {
    pub customer: CustomerRef,
    pub line_items: Vec<DraftLineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub tags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_line: Option<ShippingLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Value>,
    pub metafields: Vec<Metafield>,
}

/// Customer reference by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomerRef {
    pub id: CustomerId,
}

/// Draft order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftLineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

/// Custom shipping line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLine {
    pub title: String,
    pub price: Price,
}

/// Single-line text metafield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metafield {
    pub namespace: &'static str,
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
}

impl Metafield {
    fn text(key: &'static str, value: String) -> Self {
        Self {
            namespace: DRAFT_METAFIELD_NAMESPACE,
            key,
            kind: "single_line_text_field",
            value,
        }
    }
}

/// Non-empty string, or `None`.
fn present(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Non-null JSON value, or `None`.
fn present_value(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// Build the draft order payload.
///
/// The caller has already checked that a customer and at least one line item
/// are present.
#[must_use]
pub fn draft_order(customer_id: CustomerId, request: &DraftOrderRequest) -> DraftOrderEnvelope {
    let line_items = request
        .line_items
        .iter()
        .flatten()
        .map(|li| DraftLineItem {
            variant_id: li.variant_id,
            quantity: li.quantity.map_or(Quantity::new(1), Quantity::at_least_one),
            sku: present(li.sku.as_ref()),
            title: present(li.title.as_ref()),
            price: li.price,
        })
        .collect();

    let po_number = request
        .po_number
        .as_ref()
        .filter(|po| !po.as_str().is_empty())
        .map(LooseString::to_string);
    let shipping_method = present(request.shipping_method.as_ref());
    let ships = shipping_method.as_deref() == Some(SHIP_METHOD);

    let mut metafields = Vec::new();
    if let Some(po) = &po_number {
        metafields.push(Metafield::text("po_number", po.clone()));
    }
    if let Some(method) = &shipping_method {
        metafields.push(Metafield::text("delivery_method", method.clone()));
    }

    let shipping_line = request
        .shipping_price
        .filter(|_| ships)
        .map(|price| ShippingLine {
            title: present(request.shipping_service.as_ref()).map_or_else(
                || "Courier shipping".to_string(),
                |service| format!("Courier – {service}"),
            ),
            price,
        });

    DraftOrderEnvelope {
        draft_order: DraftOrderPayload {
            customer: CustomerRef { id: customer_id },
            line_items,
            note: po_number.map(|po| format!("PO: {po}")),
            tags: vec![DRAFT_ORDER_TAG],
            shipping_line,
            billing_address: present_value(request.billing_address.as_ref()),
            shipping_address: if ships {
                present_value(request.shipping_address.as_ref())
            } else {
                None
            },
            metafields,
        },
    }
}

/// `POST /orders/{id}/fulfillments.json` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentEnvelope {
    pub fulfillment: FulfillmentPayload,
}

/// Fulfillment fields sent to Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    pub tracking_company: String,
    pub tracking_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    pub notify_customer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<FulfillmentLineItem>>,
}

/// Line item subset to fulfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FulfillmentLineItem {
    pub id: LineItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

/// Validated fulfillment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentTarget {
    pub order_id: OrderId,
}

/// Build the fulfillment payload.
///
/// Returns `None` when the order id or tracking number is missing.
#[must_use]
pub fn fulfillment(
    request: &FulfillRequest,
    location_id: Option<u64>,
    default_tracking_company: &str,
) -> Option<(FulfillmentTarget, FulfillmentEnvelope)> {
    let order_id = request.order_id?;
    let tracking_number = request
        .tracking_number
        .as_ref()
        .filter(|tn| !tn.as_str().is_empty())?;

    let line_items = request
        .line_items
        .as_ref()
        .filter(|items| !items.is_empty())
        .map(|items| {
            items
                .iter()
                .map(|li| FulfillmentLineItem {
                    id: li.id,
                    quantity: li.quantity,
                })
                .collect()
        });

    let envelope = FulfillmentEnvelope {
        fulfillment: FulfillmentPayload {
            location_id,
            tracking_company: present(request.tracking_company.as_ref())
                .unwrap_or_else(|| default_tracking_company.to_string()),
            tracking_number: tracking_number.to_string(),
            tracking_url: present(request.tracking_url.as_ref()),
            notify_customer: true,
            line_items,
        },
    };

    Some((FulfillmentTarget { order_id }, envelope))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn draft_request(value: Value) -> DraftOrderRequest {
        serde_json::from_value(value).unwrap()
    }

    fn draft_json(value: Value) -> Value {
        let request = draft_request(value);
        let customer_id = request.customer_id.unwrap();
        serde_json::to_value(draft_order(customer_id, &request)).unwrap()
    }

    #[test]
    fn test_draft_order_ship_with_price_adds_shipping_line() {
        let body = draft_json(json!({
            "customerId": 77,
            "shippingMethod": "ship",
            "shippingPrice": 150,
            "shippingAddress": { "city": "Paarl" },
            "lineItems": [{ "variantId": "4001", "quantity": 3, "price": 12.5 }]
        }));

        let draft = &body["draft_order"];
        assert_eq!(draft["shipping_line"], json!({ "title": "Courier shipping", "price": "150.00" }));
        assert_eq!(draft["shipping_address"], json!({ "city": "Paarl" }));
        assert_eq!(
            draft["line_items"],
            json!([{ "variant_id": 4001, "quantity": 3, "price": "12.50" }])
        );
        assert_eq!(draft["tags"], json!(["FLOCS"]));
        assert_eq!(draft["customer"], json!({ "id": 77 }));
        assert_eq!(
            draft["metafields"],
            json!([{
                "namespace": "flocs",
                "key": "delivery_method",
                "type": "single_line_text_field",
                "value": "ship"
            }])
        );
    }

    #[test]
    fn test_draft_order_ship_without_price_has_no_shipping_line() {
        let body = draft_json(json!({
            "customerId": 77,
            "shippingMethod": "ship",
            "lineItems": [{ "variantId": 4001 }]
        }));

        let draft = &body["draft_order"];
        assert!(draft.get("shipping_line").is_none());
        assert_eq!(draft["line_items"][0]["quantity"], 1);
    }

    #[test]
    fn test_draft_order_accepts_string_quantities() {
        let body = draft_json(json!({
            "customerId": "77",
            "lineItems": [
                { "variantId": "4001", "quantity": "2" },
                { "variantId": "4002", "quantity": "0" }
            ]
        }));

        let lines = &body["draft_order"]["line_items"];
        assert_eq!(lines[0]["quantity"], 2);
        assert_eq!(lines[1]["quantity"], 1);
    }

    #[test]
    fn test_draft_order_named_service() {
        let body = draft_json(json!({
            "customerId": 77,
            "shippingMethod": "ship",
            "shippingPrice": "99.9",
            "shippingService": "Overnight",
            "lineItems": [{ "variantId": 4001 }]
        }));

        assert_eq!(
            body["draft_order"]["shipping_line"],
            json!({ "title": "Courier – Overnight", "price": "99.90" })
        );
    }

    #[test]
    fn test_draft_order_pickup_drops_shipping_address() {
        let body = draft_json(json!({
            "customerId": 77,
            "shippingMethod": "pickup",
            "shippingPrice": 150,
            "poNumber": 5521,
            "shippingAddress": { "city": "Paarl" },
            "billingAddress": { "city": "Bellville" },
            "lineItems": [{ "variantId": 4001, "sku": "", "title": "Droewors" }]
        }));

        let draft = &body["draft_order"];
        assert!(draft.get("shipping_line").is_none());
        assert!(draft.get("shipping_address").is_none());
        assert_eq!(draft["billing_address"], json!({ "city": "Bellville" }));
        assert_eq!(draft["note"], "PO: 5521");
        assert_eq!(draft["metafields"][0]["key"], "po_number");
        assert_eq!(draft["metafields"][0]["value"], "5521");
        assert_eq!(draft["metafields"][1]["value"], "pickup");
        assert_eq!(draft["line_items"][0], json!({ "variant_id": 4001, "quantity": 1, "title": "Droewors" }));
    }

    fn fulfill_request(value: Value) -> FulfillRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_fulfillment_requires_order_and_tracking() {
        assert!(fulfillment(&fulfill_request(json!({ "orderId": 1 })), None, "SWE Couriers").is_none());
        assert!(
            fulfillment(&fulfill_request(json!({ "trackingNumber": "TN1" })), None, "SWE Couriers")
                .is_none()
        );
        assert!(
            fulfillment(
                &fulfill_request(json!({ "orderId": 1, "trackingNumber": "" })),
                None,
                "SWE Couriers"
            )
            .is_none()
        );
    }

    #[test]
    fn test_fulfillment_payload_defaults() {
        let (target, envelope) = fulfillment(
            &fulfill_request(json!({ "orderId": "450789469", "trackingNumber": 123_456 })),
            Some(655_441_491),
            "SWE Couriers",
        )
        .unwrap();

        assert_eq!(target.order_id, OrderId::new(450_789_469));
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({
                "fulfillment": {
                    "location_id": 655_441_491,
                    "tracking_company": "SWE Couriers",
                    "tracking_number": "123456",
                    "notify_customer": true
                }
            })
        );
    }

    #[test]
    fn test_fulfillment_payload_with_line_items() {
        let (_, envelope) = fulfillment(
            &fulfill_request(json!({
                "orderId": 1,
                "trackingNumber": "TN1",
                "trackingUrl": "https://track.test/TN1",
                "trackingCompany": "Dawn Wing",
                "lineItems": [{ "id": 31, "quantity": 2, "title": "ignored" }]
            })),
            None,
            "SWE Couriers",
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({
                "fulfillment": {
                    "tracking_company": "Dawn Wing",
                    "tracking_number": "TN1",
                    "tracking_url": "https://track.test/TN1",
                    "notify_customer": true,
                    "line_items": [{ "id": 31, "quantity": 2 }]
                }
            })
        );
    }
}
