use ambre_core::Product;

/// Products whose name, category or description contains `query`, ignoring
/// case. A blank query matches nothing.
#[must_use]
pub fn search_products(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    products
        .iter()
        .filter(|product| product.matches(&needle))
        .cloned()
        .collect()
}
