//! Conversion between content-store documents and domain types.
//!
//! Malformed product documents never fail a whole catalog read: they are
//! skipped (or patched with a fallback image) and logged.

use ambre_core::{Order, PLACEHOLDER_IMAGE, Product};
use serde_json::{Map, Value, json};
use tracing::warn;

/// Document type of order documents.
pub const ORDER_TYPE: &str = "order";

/// Convert raw product documents, skipping the ones that cannot be read.
pub fn products_from_documents(documents: Vec<Value>) -> Vec<Product> {
    documents.into_iter().filter_map(product_from_document).collect()
}

/// Convert one raw product document.
///
/// Returns `None` (and logs) when required fields are missing or invalid.
pub fn product_from_document(mut document: Value) -> Option<Product> {
    if let Some(fields) = document.as_object_mut() {
        strip_nulls(fields);
    }

    let mut product: Product = match serde_json::from_value(document) {
        Ok(product) => product,
        Err(e) => {
            warn!(error = %e, "Skipping malformed product document");
            return None;
        }
    };

    product.images.retain(|url| !url.trim().is_empty());
    if product.images.is_empty() {
        warn!(product_id = %product.id, "Product has no images, using placeholder");
        product.images.push(PLACEHOLDER_IMAGE.to_owned());
    }

    Some(product)
}

/// Serialize an order as a `create` mutation document.
///
/// # Errors
///
/// Returns an error if the order cannot be serialized.
pub fn order_document(order: &Order) -> Result<Value, serde_json::Error> {
    let mut document = serde_json::to_value(order)?;
    if let Some(fields) = document.as_object_mut() {
        fields.insert("_id".to_owned(), json!(order.order_id));
        fields.insert("_type".to_owned(), json!(ORDER_TYPE));
    }
    Ok(document)
}

/// GROQ projections return `null` for absent fields; treat them as absent so
/// serde defaults apply.
fn strip_nulls(fields: &mut Map<String, Value>) {
    fields.retain(|_, value| !value.is_null());
    for value in fields.values_mut() {
        if let Some(nested) = value.as_object_mut() {
            strip_nulls(nested);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use ambre_core::{IndianState, OrderId, ShippingAddress, UserId};
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_nulls_fall_back_to_defaults() {
        let product = product_from_document(json!({
            "id": "velvet-iris",
            "name": "Velvet Iris",
            "category": null,
            "description": null,
            "price": 2899,
            "stock": null,
            "images": null,
            "notes": { "top": null, "middle": ["Iris"], "base": null },
            "sizes": null,
            "featured": true,
            "bestSeller": null,
            "new": null
        }))
        .unwrap();

        assert_eq!(product.category, "");
        assert_eq!(product.stock, 0);
        assert_eq!(product.notes.middle, vec!["Iris".to_string()]);
        assert_eq!(product.images, vec![PLACEHOLDER_IMAGE.to_string()]);
        assert!(product.featured);
    }

    #[test]
    fn test_malformed_documents_are_skipped() {
        let products = products_from_documents(vec![
            json!({ "id": "no-price", "name": "No Price" }),
            json!({ "id": "neg", "name": "Negative", "price": -10 }),
            json!("not an object"),
            json!({ "id": "ok", "name": "Fine", "price": 100, "images": ["/a.jpg"] }),
        ]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "ok");
        assert_eq!(products[0].images, vec!["/a.jpg".to_string()]);
    }

    #[test]
    fn test_order_document_has_system_fields() {
        let order = Order::pending(
            OrderId::new("ORD-9"),
            UserId::new("u1"),
            "a@b.in".to_string(),
            &[],
            ShippingAddress {
                name: "Zoya".to_string(),
                email: "a@b.in".to_string(),
                phone: "9999999999".to_string(),
                address: "1 Lake View".to_string(),
                city: "Srinagar".to_string(),
                state: IndianState::JammuAndKashmir,
                pincode: "190001".to_string(),
            },
            Utc::now(),
        );
        let document = order_document(&order).unwrap();
        assert_eq!(document["_id"], "ORD-9");
        assert_eq!(document["_type"], "order");
        assert_eq!(document["paymentStatus"], "pending");

        // Documents read back ignore the system fields.
        let parsed: Order = serde_json::from_value(document).unwrap();
        assert_eq!(parsed, order);
    }
}
