//! Reduce Shopify REST records to the shapes the scan station UI renders.

use serde_json::Value;

use scan_station_core::{DeliveryMethod, parcel_count_from_tags};

use super::types::{
    CustomerSummary, DraftOrderSummary, LineItemSummary, OrderSummary, RestCustomer,
    RestDraftOrder, RestMetafield, RestOrder,
};

/// Metafield namespace holding the courier place code.
pub const PLACE_CODE_NAMESPACE: &str = "custom";
/// Metafield key holding the courier place code.
pub const PLACE_CODE_KEY: &str = "parcelperfect_place_code";

/// Non-empty trimmed text, or `None`.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Convert a REST order into an open-order row.
#[must_use]
pub fn order_summary(order: RestOrder) -> OrderSummary {
    let shipping = order.shipping_address.unwrap_or_default();
    let customer = order.customer.unwrap_or_default();

    let parcel_count = order
        .tags
        .as_deref()
        .filter(|tags| !tags.trim().is_empty())
        .and_then(parcel_count_from_tags);

    let customer_name = non_empty(shipping.name.as_deref()).map_or_else(
        || {
            let full = format!(
                "{} {}",
                customer.first_name.as_deref().unwrap_or_default().trim(),
                customer.last_name.as_deref().unwrap_or_default().trim()
            );
            let full = full.trim();
            if full.is_empty() {
                order
                    .name
                    .as_deref()
                    .map(|name| name.strip_prefix('#').unwrap_or(name))
                    .unwrap_or_default()
                    .to_string()
            } else {
                full.to_string()
            }
        },
        String::from,
    );

    let line_items = order
        .line_items
        .unwrap_or_default()
        .into_iter()
        .map(|li| LineItemSummary {
            title: li.title,
            quantity: li.quantity,
        })
        .collect();

    OrderSummary {
        id: order.id,
        name: order.name,
        customer_name,
        created_at: non_empty(order.processed_at.as_deref())
            .map(String::from)
            .or(order.created_at),
        fulfillment_status: order.fulfillment_status,
        shipping_city: shipping.city.unwrap_or_default(),
        shipping_postal: shipping.zip.unwrap_or_default(),
        parcel_count,
        line_items,
    }
}

/// Convert a customer search hit into a UI row.
///
/// The display name falls back through first+last name, company, email and
/// finally the numeric id.
#[must_use]
pub fn customer_summary(customer: RestCustomer) -> CustomerSummary {
    let delivery_method = DeliveryMethod::from_tags(customer.tags.as_slice());

    let full_name = format!(
        "{} {}",
        customer.first_name.as_deref().unwrap_or_default(),
        customer.last_name.as_deref().unwrap_or_default()
    );
    let name = [
        Some(full_name.trim()),
        customer.company.as_deref(),
        customer.email.as_deref(),
    ]
    .into_iter()
    .find_map(non_empty)
    .map_or_else(|| customer.id.to_string(), String::from);

    CustomerSummary {
        id: customer.id,
        name,
        email: customer.email.unwrap_or_default(),
        phone: customer.phone.unwrap_or_default(),
        delivery_method,
        default_address: customer.default_address.filter(|a| !a.is_null()),
        addresses: customer.addresses.unwrap_or_default(),
    }
}

/// Pick the courier place code out of a customer's metafields.
#[must_use]
pub fn place_code(metafields: Vec<RestMetafield>) -> Option<Value> {
    metafields
        .into_iter()
        .find(|mf| mf.namespace == PLACE_CODE_NAMESPACE && mf.key == PLACE_CODE_KEY)
        .map(|mf| mf.value)
        .filter(is_truthy)
}

/// Reduce a created draft order, linking it into Shopify admin.
#[must_use]
pub fn draft_order_summary(draft: RestDraftOrder, store: &str) -> DraftOrderSummary {
    DraftOrderSummary {
        admin_url: draft
            .id
            .map(|id| format!("{store}/admin/draft_orders/{id}")),
        id: draft.id,
        name: draft.name,
        invoice_url: non_empty(draft.invoice_url.as_deref()).map(String::from),
        subtotal_price: draft.subtotal_price,
        total_price: draft.total_price,
    }
}

/// Metafield values count only when they carry something.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(value: Value) -> RestOrder {
        serde_json::from_value(value).unwrap()
    }

    fn customer(value: Value) -> RestCustomer {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_order_summary_reads_parcel_count_tag() {
        let summary = order_summary(order(json!({
            "id": 5001,
            "name": "#1042",
            "tags": "fragile, parcel_count_3, urgent",
            "created_at": "2024-10-01T10:00:00+02:00",
            "processed_at": "2024-10-01T09:59:00+02:00",
            "fulfillment_status": null,
            "shipping_address": { "name": "Thandi Mokoena", "city": "Cape Town", "zip": "8001" },
            "line_items": [{ "title": "Biltong 1kg", "quantity": 2, "sku": "BLT-1" }]
        })));

        assert_eq!(summary.parcel_count, Some(3));
        assert_eq!(summary.customer_name, "Thandi Mokoena");
        assert_eq!(summary.created_at.as_deref(), Some("2024-10-01T09:59:00+02:00"));
        assert_eq!(summary.shipping_city, "Cape Town");
        assert_eq!(summary.shipping_postal, "8001");
        assert_eq!(
            summary.line_items,
            vec![LineItemSummary {
                title: Some("Biltong 1kg".to_string()),
                quantity: Some(2)
            }]
        );
    }

    #[test]
    fn test_order_summary_name_fallbacks() {
        let from_customer = order_summary(order(json!({
            "id": 1,
            "name": "#7",
            "customer": { "first_name": " Pieter ", "last_name": "van Wyk" }
        })));
        assert_eq!(from_customer.customer_name, "Pieter van Wyk");

        let from_order_name = order_summary(order(json!({
            "id": 2,
            "name": "#1043",
            "customer": { "first_name": null, "last_name": "" }
        })));
        assert_eq!(from_order_name.customer_name, "1043");
        assert_eq!(from_order_name.parcel_count, None);
        assert_eq!(from_order_name.shipping_city, "");
        assert!(from_order_name.line_items.is_empty());
    }

    #[test]
    fn test_customer_summary_pickup_overrides_delivery() {
        let summary = customer_summary(customer(json!({
            "id": 9,
            "first_name": "Anele",
            "last_name": "Dlamini",
            "tags": ["pickup", "delivery"]
        })));

        assert_eq!(summary.delivery_method, Some(DeliveryMethod::Pickup));
        assert_eq!(summary.name, "Anele Dlamini");
        assert_eq!(summary.email, "");
        assert!(summary.addresses.is_empty());
    }

    #[test]
    fn test_customer_summary_reads_rest_tag_string() {
        let summary = customer_summary(customer(json!({
            "id": 10,
            "tags": "wholesale, Delivery"
        })));
        assert_eq!(summary.delivery_method, Some(DeliveryMethod::Deliver));
    }

    #[test]
    fn test_customer_summary_display_name_fallbacks() {
        let company = customer_summary(customer(json!({ "id": 11, "company": "Spar Tokai" })));
        assert_eq!(company.name, "Spar Tokai");

        let email = customer_summary(customer(json!({ "id": 12, "email": "orders@shop.test" })));
        assert_eq!(email.name, "orders@shop.test");

        let id_only = customer_summary(customer(json!({ "id": 13, "first_name": "" })));
        assert_eq!(id_only.name, "13");
        assert_eq!(id_only.delivery_method, None);
    }

    #[test]
    fn test_place_code_lookup() {
        let metafields: Vec<RestMetafield> = serde_json::from_value(json!([
            { "namespace": "custom", "key": "other", "value": "x" },
            { "namespace": "custom", "key": "parcelperfect_place_code", "value": "4011" }
        ]))
        .unwrap();
        assert_eq!(place_code(metafields), Some(json!("4011")));

        let empty: Vec<RestMetafield> = serde_json::from_value(json!([
            { "namespace": "custom", "key": "parcelperfect_place_code", "value": "" }
        ]))
        .unwrap();
        assert_eq!(place_code(empty), None);
    }

    #[test]
    fn test_draft_order_summary_admin_url() {
        let draft: RestDraftOrder = serde_json::from_value(json!({
            "id": 1_100_000_001_u64,
            "name": "#D12",
            "invoice_url": "https://shop.test/invoices/abc",
            "subtotal_price": "300.00",
            "total_price": "345.00"
        }))
        .unwrap();

        let summary = draft_order_summary(draft, "https://example.myshopify.com");
        assert_eq!(
            summary.admin_url.as_deref(),
            Some("https://example.myshopify.com/admin/draft_orders/1100000001")
        );
        assert_eq!(summary.total_price.as_deref(), Some("345.00"));
    }
}
