//! Product documents as served by the content store.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Image shown when a product document carries no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder-bottle.jpg";

/// Top, middle (heart) and base notes of a fragrance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragranceNotes {
    #[serde(default)]
    pub top: Vec<String>,
    #[serde(default)]
    pub middle: Vec<String>,
    #[serde(default)]
    pub base: Vec<String>,
}

impl FragranceNotes {
    /// All notes, top to base.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.top
            .iter()
            .chain(&self.middle)
            .chain(&self.base)
            .map(String::as_str)
    }
}

/// A perfume in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Units on hand. Informational; the content store does not reserve stock.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub notes: FragranceNotes,
    /// Bottle sizes offered, e.g. "50ml". Empty when there is a single size.
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub best_seller: bool,
    #[serde(default, rename = "new")]
    pub is_new: bool,
}

impl Product {
    /// The first image, or the placeholder bottle when there is none.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images
            .iter()
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive match of `needle` (already lowercased) against name,
    /// category and description.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.category, &self.description]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn oud() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "oud-royale",
            "name": "Oud Royale",
            "category": "Woody",
            "description": "Smoky agarwood with saffron.",
            "price": 3499,
            "stock": 4,
            "images": ["", "https://cdn.example/oud.jpg"],
            "notes": { "top": ["Saffron"], "base": ["Oud", "Amber"] },
            "bestSeller": true,
            "new": true
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_content_document() {
        let product = oud();
        assert_eq!(product.id.as_str(), "oud-royale");
        assert_eq!(product.price, Price::from_rupees(3499));
        assert!(product.best_seller);
        assert!(product.is_new);
        assert!(!product.featured);
        assert!(product.notes.middle.is_empty());
        assert_eq!(
            product.notes.iter().collect::<Vec<_>>(),
            vec!["Saffron", "Oud", "Amber"]
        );
    }

    #[test]
    fn test_primary_image_skips_blank() {
        assert_eq!(oud().primary_image(), "https://cdn.example/oud.jpg");
    }

    #[test]
    fn test_primary_image_placeholder() {
        let mut product = oud();
        product.images.clear();
        assert_eq!(product.primary_image(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_matches_is_case_insensitive_over_fields() {
        let product = oud();
        assert!(product.matches("royale"));
        assert!(product.matches("woody"));
        assert!(product.matches("saffron"));
        assert!(!product.matches("citrus"));
    }
}
