//! Cart lines and wishlist entries.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Identity of a cart line: the product plus the selected variant (size).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a ProductId,
    pub variant: Option<&'a str>,
}

/// One entry in the cart.
///
/// `quantity` is never zero: decrementing a line to zero removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<String>,
    pub image_ref: String,
    /// Stock at the time the product was added, for the store's stock policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl CartLine {
    /// Build a line from a product snapshot.
    ///
    /// A zero `quantity` is raised to one.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32, variant: Option<String>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.max(1),
            selected_variant: variant,
            image_ref: product.primary_image().to_owned(),
            stock: Some(product.stock),
        }
    }

    #[must_use]
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: &self.product_id,
            variant: self.selected_variant.as_deref(),
        }
    }

    /// Whether this line has the given product and variant.
    #[must_use]
    pub fn is(&self, product_id: &ProductId, variant: Option<&str>) -> bool {
        self.key()
            == LineKey {
                product_id,
                variant,
            }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

/// A product the customer saved for later. Unique by product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub product: Product,
}

impl From<&Product> for WishlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product: product.clone(),
        }
    }
}
