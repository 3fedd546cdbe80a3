//! Product catalog views.
//!
//! [`Catalog`] reads products from a [`ContentStore`] and falls back to the
//! bundled [`sample_catalog`] whenever the store fails or has no products,
//! so the shop never renders empty.

mod sample;
mod search;

use std::collections::BTreeSet;

use ambre_core::{Product, ProductId};
use tracing::{instrument, warn};

use crate::content::ContentStore;
use crate::error::add_breadcrumb;

pub use sample::sample_catalog;
pub use search::search_products;

/// Catalog views over a content store.
#[derive(Debug, Clone)]
pub struct Catalog<C> {
    content: C,
}

impl<C: ContentStore> Catalog<C> {
    #[must_use]
    pub const fn new(content: C) -> Self {
        Self { content }
    }

    /// The underlying content store.
    #[must_use]
    pub const fn content(&self) -> &C {
        &self.content
    }

    /// Every product, or the sample catalog when the store cannot supply any.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Vec<Product> {
        match self.content.fetch_products().await {
            Ok(products) if !products.is_empty() => products,
            Ok(_) => {
                warn!("Content store has no products, using sample catalog");
                sample_catalog()
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch products, using sample catalog");
                add_breadcrumb("catalog", "Fell back to sample catalog", None);
                sample_catalog()
            }
        }
    }

    /// One product by id, looked up in the sample catalog when the store
    /// fails or does not have it.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        match self.content.fetch_product(id).await {
            Ok(Some(product)) => return Some(product),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to fetch product, trying sample catalog"),
        }
        sample_catalog().into_iter().find(|p| &p.id == id)
    }

    pub async fn featured(&self) -> Vec<Product> {
        self.filtered(|p| p.featured).await
    }

    pub async fn best_sellers(&self) -> Vec<Product> {
        self.filtered(|p| p.best_seller).await
    }

    pub async fn new_arrivals(&self) -> Vec<Product> {
        self.filtered(|p| p.is_new).await
    }

    /// Products in `category`, compared case-insensitively.
    pub async fn by_category(&self, category: &str) -> Vec<Product> {
        let category = category.trim();
        self.filtered(|p| p.category.eq_ignore_ascii_case(category))
            .await
    }

    /// Up to `limit` other products, same category first.
    pub async fn related(&self, product: &Product, limit: usize) -> Vec<Product> {
        let (mut related, others): (Vec<Product>, Vec<Product>) = self
            .products()
            .await
            .into_iter()
            .filter(|p| p.id != product.id)
            .partition(|p| p.category.eq_ignore_ascii_case(&product.category));

        related.extend(others);
        related.truncate(limit);
        related
    }

    /// Distinct non-empty categories, sorted.
    pub async fn categories(&self) -> Vec<String> {
        self.products()
            .await
            .into_iter()
            .map(|p| p.category)
            .filter(|c| !c.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Case-insensitive search over the whole catalog.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        search_products(&self.products().await, query)
    }

    async fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.products()
            .await
            .into_iter()
            .filter(|p| keep(p))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use ambre_core::Price;

    use super::*;
    use crate::content::MemoryContentStore;

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            category: category.to_string(),
            description: String::new(),
            price: Price::from_rupees(1000),
            stock: 5,
            images: vec![],
            notes: ambre_core::FragranceNotes::default(),
            sizes: vec![],
            featured: id.starts_with('f'),
            best_seller: false,
            is_new: false,
        }
    }

    #[tokio::test]
    async fn test_empty_store_falls_back_to_samples() {
        let catalog = Catalog::new(MemoryContentStore::new());
        assert_eq!(catalog.products().await, sample_catalog());
    }

    #[tokio::test]
    async fn test_failing_store_falls_back_to_samples() {
        let store = MemoryContentStore::with_products(vec![product("a", "Woody")]);
        store.set_offline(true);
        let catalog = Catalog::new(store);

        assert_eq!(catalog.products().await, sample_catalog());
        let oud = catalog.product(&ProductId::new("oud-royale")).await;
        assert_eq!(oud.unwrap().name, "Oud Royale");
    }

    #[tokio::test]
    async fn test_store_products_win() {
        let catalog = Catalog::new(MemoryContentStore::with_products(vec![
            product("fa", "Woody"),
            product("b", "woody"),
            product("c", "Floral"),
            product("d", ""),
        ]));

        assert_eq!(catalog.products().await.len(), 4);
        assert_eq!(catalog.featured().await.len(), 1);
        assert_eq!(catalog.by_category(" WOODY ").await.len(), 2);
        assert_eq!(catalog.categories().await, vec!["Floral", "Woody", "woody"]);
        assert!(catalog.product(&ProductId::new("zzz")).await.is_none());
    }

    #[tokio::test]
    async fn test_related_prefers_same_category() {
        let catalog = Catalog::new(MemoryContentStore::with_products(vec![
            product("a", "Floral"),
            product("b", "Woody"),
            product("c", "Woody"),
            product("d", "Citrus"),
        ]));
        let subject = product("b", "Woody");

        let related = catalog.related(&subject, 2).await;
        let ids: Vec<&str> = related.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert!(catalog.related(&subject, 0).await.is_empty());
    }
}
