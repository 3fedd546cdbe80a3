//! GROQ queries against the content store.
//!
//! Parameters are bound separately (as `$name`) and never interpolated.

/// Product projection shared by the product queries.
macro_rules! product_projection {
    () => {
        r#"{
  "id": _id,
  name,
  category,
  description,
  price,
  stock,
  "images": images[].asset->url,
  notes,
  sizes,
  featured,
  bestSeller,
  "new": new
}"#
    };
}

/// Every product, ordered by name.
pub const ALL_PRODUCTS: &str = concat!(
    r#"*[_type == "product"] | order(name asc) "#,
    product_projection!()
);

/// One product by document id. Param: `$id`.
pub const PRODUCT_BY_ID: &str = concat!(
    r#"*[_type == "product" && _id == $id][0] "#,
    product_projection!()
);

/// One order by order id. Param: `$orderId`.
pub const ORDER_BY_ID: &str = r#"*[_type == "order" && orderId == $orderId][0]"#;

/// A customer's orders, newest first. Param: `$userId`.
pub const ORDERS_FOR_USER: &str =
    r#"*[_type == "order" && userId == $userId] | order(createdAt desc)"#;

/// Every order, newest first.
pub const ALL_ORDERS: &str = r#"*[_type == "order"] | order(createdAt desc)"#;

/// Pending orders older than a cutoff. Param: `$cutoff` (RFC 3339).
pub const PENDING_ORDERS_BEFORE: &str =
    r#"*[_type == "order" && paymentStatus == "pending" && createdAt < $cutoff]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_queries_project_id() {
        for query in [ALL_PRODUCTS, PRODUCT_BY_ID] {
            assert!(query.contains(r#""id": _id"#));
            assert!(query.contains(r#"_type == "product""#));
        }
    }

    #[test]
    fn test_params_are_bound() {
        assert!(PRODUCT_BY_ID.contains("$id"));
        assert!(ORDER_BY_ID.contains("$orderId"));
        assert!(ORDERS_FOR_USER.contains("$userId"));
        assert!(PENDING_ORDERS_BEFORE.contains("$cutoff"));
    }
}
