//! Client state store: cart, wishlist, recently viewed, signed-in user and
//! transient search results for the active session.
//!
//! The store is an ordinary value. Construct one per session and pass it by
//! `&mut` to whatever mutates it; tests build isolated in-memory instances.
//!
//! Every operation is synchronous and infallible. Misuse (removing a line
//! that does not exist, setting a quantity below one) is a silent no-op.
//! After each committed change the registered [`StoreObserver`]s are
//! notified; persistence is one such observer.
//!
//! # Example
//!
//! ```rust
//! use ambre_storefront::store::{ClientStore, MemoryStorage};
//! use ambre_storefront::catalog::sample_catalog;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut store = ClientStore::persistent(storage.clone());
//! let catalog = sample_catalog();
//!
//! store.add_to_cart(&catalog[0], 2, None);
//! store.add_to_cart(&catalog[0], 3, None);
//! assert_eq!(store.count(), 5);
//!
//! // A new store over the same storage sees the same cart.
//! let reloaded = ClientStore::persistent(storage);
//! assert_eq!(reloaded.cart(), store.cart());
//! ```

mod persist;
mod state;
mod storage;

use std::sync::Arc;

use ambre_core::{CartLine, Price, Product, ProductId, WishlistEntry};
use tracing::debug;

pub use persist::{CART_KEY, Persister, RECENTLY_VIEWED_KEY, StoreObserver, WISHLIST_KEY};
pub use state::{Action, RECENTLY_VIEWED_LIMIT, Slice, StockPolicy, StoreState, apply};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use crate::catalog::search_products;
use crate::identity::Identity;

/// Transient search state; never persisted.
#[derive(Debug, Clone, Default)]
struct SearchState {
    query: String,
    results: Vec<Product>,
}

/// The client state store.
pub struct ClientStore {
    state: StoreState,
    stock_policy: StockPolicy,
    observers: Vec<Arc<dyn StoreObserver>>,
    user: Option<Identity>,
    search: SearchState,
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ClientStore {
    /// An empty store that persists nothing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_state(StoreState::default())
    }

    /// A store seeded with `state` and no observers.
    #[must_use]
    pub fn from_state(state: StoreState) -> Self {
        Self {
            state,
            stock_policy: StockPolicy::default(),
            observers: Vec::new(),
            user: None,
            search: SearchState::default(),
        }
    }

    /// A store hydrated from `storage` that writes every change back to it.
    #[must_use]
    pub fn persistent(storage: Arc<dyn Storage>) -> Self {
        let persister = Persister::new(storage);
        let state = persister.hydrate();
        debug!(
            cart_lines = state.cart.len(),
            wishlist = state.wishlist.len(),
            "Hydrated client store"
        );
        let mut store = Self::from_state(state);
        store.subscribe(Arc::new(persister));
        store
    }

    /// Set how quantities beyond stock are treated.
    #[must_use]
    pub const fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    /// Register an observer for committed transitions.
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Apply an action and notify observers if anything changed.
    pub fn dispatch(&mut self, action: Action) -> Option<Slice> {
        let changed = apply(&mut self.state, action, self.stock_policy)?;
        for observer in &self.observers {
            observer.committed(changed, &self.state);
        }
        Some(changed)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` units of `product`, merging into an existing line with
    /// the same variant.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32, variant: Option<&str>) {
        if quantity < 1 {
            return;
        }
        let line = CartLine::from_product(product, quantity, variant.map(str::to_owned));
        self.dispatch(Action::AddToCart(line));
    }

    /// Remove the line for `product_id`/`variant`, if present.
    pub fn remove_from_cart(&mut self, product_id: &ProductId, variant: Option<&str>) {
        self.dispatch(Action::RemoveFromCart {
            product_id: product_id.clone(),
            variant: variant.map(str::to_owned),
        });
    }

    /// Set a line's quantity exactly. Quantities below one are ignored.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&str>,
    ) {
        self.dispatch(Action::UpdateQuantity {
            product_id: product_id.clone(),
            variant: variant.map(str::to_owned),
            quantity,
        });
    }

    pub fn clear_cart(&mut self) {
        self.dispatch(Action::ClearCart);
    }

    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.state.cart
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.state.cart.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.state.cart.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn is_cart_empty(&self) -> bool {
        self.state.cart.is_empty()
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Save `product`; already-saved products are left alone.
    pub fn add_to_wishlist(&mut self, product: &Product) {
        self.dispatch(Action::AddToWishlist(WishlistEntry::from(product)));
    }

    pub fn remove_from_wishlist(&mut self, product_id: &ProductId) {
        self.dispatch(Action::RemoveFromWishlist(product_id.clone()));
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.state
            .wishlist
            .iter()
            .any(|entry| &entry.product_id == product_id)
    }

    /// Add or remove `product`; returns whether it is saved afterwards.
    pub fn toggle_wishlist(&mut self, product: &Product) -> bool {
        if self.is_in_wishlist(&product.id) {
            self.remove_from_wishlist(&product.id);
            false
        } else {
            self.add_to_wishlist(product);
            true
        }
    }

    #[must_use]
    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.state.wishlist
    }

    // =========================================================================
    // Recently viewed
    // =========================================================================

    /// Move `product` to the front of the recently viewed list.
    pub fn record_view(&mut self, product: &Product) {
        self.dispatch(Action::RecordView(product.clone()));
    }

    #[must_use]
    pub fn recently_viewed(&self) -> &[Product] {
        &self.state.recently_viewed
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Update the signed-in user, as reported by the identity session listener.
    pub fn set_user(&mut self, user: Option<Identity>) {
        self.user = user;
    }

    #[must_use]
    pub const fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Run a search over `catalog` and keep the results.
    ///
    /// A blank query clears the results rather than listing everything.
    pub fn search(&mut self, query: &str, catalog: &[Product]) -> &[Product] {
        self.search = SearchState {
            query: query.to_owned(),
            results: search_products(catalog, query),
        };
        &self.search.results
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search.query
    }

    #[must_use]
    pub fn search_results(&self) -> &[Product] {
        &self.search.results
    }

    /// The persisted state, for snapshotting.
    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }
}
