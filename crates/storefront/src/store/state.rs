//! Pure state transitions for the client store.
//!
//! `apply` is the only place the store's data changes. It performs no I/O;
//! the caller decides what to do with the returned [`Slice`].

use ambre_core::{CartLine, Product, ProductId, WishlistEntry};

/// Maximum number of products kept in the recently-viewed list.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// The persisted parts of the client store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistEntry>,
    pub recently_viewed: Vec<Product>,
}

impl StoreState {
    /// Rebuild state read from outside the reducer by replaying it through
    /// [`apply`].
    ///
    /// Zero-quantity lines are dropped and lines sharing a key are merged.
    /// Wishlist entries are unique by product, and recently viewed is
    /// deduplicated (first occurrence wins) and capped.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut state = Self::default();
        for line in self.cart {
            add_line(&mut state.cart, line, StockPolicy::Unchecked);
        }
        for entry in self.wishlist {
            apply(&mut state, Action::AddToWishlist(entry), StockPolicy::Unchecked);
        }
        for product in self.recently_viewed.into_iter().rev() {
            apply(&mut state, Action::RecordView(product), StockPolicy::Unchecked);
        }
        state
    }
}

/// Which part of the state a transition changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Cart,
    Wishlist,
    RecentlyViewed,
}

/// How the store treats quantities beyond a line's stock snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Accept any quantity; callers enforce stock themselves.
    #[default]
    Unchecked,
    /// Cap quantities at the stock recorded on the line.
    Clamp,
}

impl StockPolicy {
    fn limit(self, requested: u32, stock: Option<u32>) -> u32 {
        match (self, stock) {
            // Out-of-stock snapshots still keep a line at the minimum of one.
            (Self::Clamp, Some(stock)) => requested.min(stock.max(1)),
            _ => requested,
        }
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddToCart(CartLine),
    RemoveFromCart {
        product_id: ProductId,
        variant: Option<String>,
    },
    UpdateQuantity {
        product_id: ProductId,
        variant: Option<String>,
        quantity: u32,
    },
    ClearCart,
    AddToWishlist(WishlistEntry),
    RemoveFromWishlist(ProductId),
    RecordView(Product),
}

/// Apply `action` to `state`, returning the slice it changed.
///
/// `None` means the action was a no-op (nothing to persist or announce).
pub fn apply(state: &mut StoreState, action: Action, policy: StockPolicy) -> Option<Slice> {
    match action {
        Action::AddToCart(line) => add_line(&mut state.cart, line, policy),
        Action::RemoveFromCart {
            product_id,
            variant,
        } => {
            let before = state.cart.len();
            state
                .cart
                .retain(|line| !line.is(&product_id, variant.as_deref()));
            (state.cart.len() != before).then_some(Slice::Cart)
        }
        Action::UpdateQuantity {
            product_id,
            variant,
            quantity,
        } => {
            if quantity < 1 {
                return None;
            }
            let line = state
                .cart
                .iter_mut()
                .find(|line| line.is(&product_id, variant.as_deref()))?;
            let quantity = policy.limit(quantity, line.stock);
            if line.quantity == quantity {
                return None;
            }
            line.quantity = quantity;
            Some(Slice::Cart)
        }
        Action::ClearCart => {
            if state.cart.is_empty() {
                return None;
            }
            state.cart.clear();
            Some(Slice::Cart)
        }
        Action::AddToWishlist(entry) => {
            if state
                .wishlist
                .iter()
                .any(|existing| existing.product_id == entry.product_id)
            {
                return None;
            }
            state.wishlist.push(entry);
            Some(Slice::Wishlist)
        }
        Action::RemoveFromWishlist(product_id) => {
            let before = state.wishlist.len();
            state
                .wishlist
                .retain(|entry| entry.product_id != product_id);
            (state.wishlist.len() != before).then_some(Slice::Wishlist)
        }
        Action::RecordView(product) => {
            state.recently_viewed.retain(|seen| seen.id != product.id);
            state.recently_viewed.insert(0, product);
            state.recently_viewed.truncate(RECENTLY_VIEWED_LIMIT);
            Some(Slice::RecentlyViewed)
        }
    }
}

fn add_line(cart: &mut Vec<CartLine>, mut line: CartLine, policy: StockPolicy) -> Option<Slice> {
    if line.quantity < 1 {
        return None;
    }

    let existing = cart
        .iter_mut()
        .find(|existing| existing.is(&line.product_id, line.selected_variant.as_deref()));

    match existing {
        Some(existing) => {
            let merged = existing.quantity.saturating_add(line.quantity);
            let merged = policy.limit(merged, line.stock.or(existing.stock));
            if merged == existing.quantity {
                return None;
            }
            existing.quantity = merged;
            // Keep the freshest stock snapshot for later clamping.
            if line.stock.is_some() {
                existing.stock = line.stock;
            }
        }
        None => {
            line.quantity = policy.limit(line.quantity, line.stock);
            cart.push(line);
        }
    }
    Some(Slice::Cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use ambre_core::Price;

    use super::*;

    fn line(id: &str, variant: Option<&str>, quantity: u32, stock: Option<u32>) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: id.to_string(),
            unit_price: Price::from_rupees(500),
            quantity,
            selected_variant: variant.map(str::to_string),
            image_ref: String::new(),
            stock,
        }
    }

    fn add(state: &mut StoreState, line: CartLine) -> Option<Slice> {
        apply(state, Action::AddToCart(line), StockPolicy::Unchecked)
    }

    #[test]
    fn test_normalized_repairs_invariants() {
        let viewed = |id: &str| Product {
            id: ProductId::new(id),
            name: id.to_string(),
            category: String::new(),
            description: String::new(),
            price: Price::from_rupees(500),
            stock: 1,
            images: Vec::new(),
            notes: ambre_core::FragranceNotes::default(),
            sizes: Vec::new(),
            featured: false,
            best_seller: false,
            is_new: false,
        };
        let entry = |id: &str| WishlistEntry::from(&viewed(id));

        let state = StoreState {
            cart: vec![
                line("p1", None, 0, None),
                line("p1", None, 3, None),
                line("p2", Some("50ml"), 1, None),
                line("p1", None, 2, None),
            ],
            wishlist: vec![entry("w1"), entry("w2"), entry("w1")],
            recently_viewed: (0..12)
                .map(|i| viewed(&format!("v{}", i % 11)))
                .collect(),
        }
        .normalized();

        assert_eq!(state.cart.len(), 2);
        assert_eq!(state.cart[0].product_id.as_str(), "p1");
        assert_eq!(state.cart[0].quantity, 5);
        assert_eq!(state.cart[1].product_id.as_str(), "p2");

        let wishlist: Vec<&str> = state.wishlist.iter().map(|e| e.product_id.as_str()).collect();
        assert_eq!(wishlist, ["w1", "w2"]);

        assert_eq!(state.recently_viewed.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(state.recently_viewed[0].id.as_str(), "v0");
        assert_eq!(state.recently_viewed[9].id.as_str(), "v9");
    }

    #[test]
    fn test_normalized_keeps_valid_state() {
        let state = StoreState {
            cart: vec![line("p1", None, 2, Some(4)), line("p1", Some("50ml"), 1, None)],
            ..StoreState::default()
        };
        assert_eq!(state.clone().normalized(), state);
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut state = StoreState::default();
        add(&mut state, line("p1", None, 2, None));
        add(&mut state, line("p1", None, 3, None));
        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.cart[0].quantity, 5);
    }

    #[test]
    fn test_add_separates_variants() {
        let mut state = StoreState::default();
        add(&mut state, line("p1", Some("50ml"), 1, None));
        add(&mut state, line("p1", Some("100ml"), 1, None));
        add(&mut state, line("p1", None, 1, None));
        assert_eq!(state.cart.len(), 3);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut state = StoreState::default();
        assert_eq!(add(&mut state, line("p1", None, 0, None)), None);
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_update_below_one_is_noop() {
        let mut state = StoreState::default();
        add(&mut state, line("p1", None, 2, None));
        let changed = apply(
            &mut state,
            Action::UpdateQuantity {
                product_id: ProductId::new("p1"),
                variant: None,
                quantity: 0,
            },
            StockPolicy::Unchecked,
        );
        assert_eq!(changed, None);
        assert_eq!(state.cart[0].quantity, 2);
    }

    #[test]
    fn test_update_missing_line_is_noop() {
        let mut state = StoreState::default();
        let changed = apply(
            &mut state,
            Action::UpdateQuantity {
                product_id: ProductId::new("ghost"),
                variant: None,
                quantity: 4,
            },
            StockPolicy::Unchecked,
        );
        assert_eq!(changed, None);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut state = StoreState::default();
        add(&mut state, line("p1", Some("50ml"), 1, None));
        let changed = apply(
            &mut state,
            Action::RemoveFromCart {
                product_id: ProductId::new("p1"),
                variant: None,
            },
            StockPolicy::Unchecked,
        );
        assert_eq!(changed, None);
        assert_eq!(state.cart.len(), 1);
    }

    #[test]
    fn test_clamp_policy_caps_at_stock() {
        let mut state = StoreState::default();
        apply(
            &mut state,
            Action::AddToCart(line("p1", None, 2, Some(3))),
            StockPolicy::Clamp,
        );
        apply(
            &mut state,
            Action::AddToCart(line("p1", None, 2, Some(3))),
            StockPolicy::Clamp,
        );
        assert_eq!(state.cart[0].quantity, 3);

        let changed = apply(
            &mut state,
            Action::UpdateQuantity {
                product_id: ProductId::new("p1"),
                variant: None,
                quantity: 10,
            },
            StockPolicy::Clamp,
        );
        assert_eq!(changed, None);
        assert_eq!(state.cart[0].quantity, 3);
    }

    #[test]
    fn test_unchecked_policy_ignores_stock() {
        let mut state = StoreState::default();
        add(&mut state, line("p1", None, 9, Some(3)));
        assert_eq!(state.cart[0].quantity, 9);
    }

    #[test]
    fn test_clamp_keeps_minimum_of_one() {
        assert_eq!(StockPolicy::Clamp.limit(4, Some(0)), 1);
    }

    #[test]
    fn test_recently_viewed_dedupes_and_caps() {
        let mut state = StoreState::default();
        let products: Vec<Product> = crate::catalog::sample_catalog();
        for product in products.iter().cycle().take(RECENTLY_VIEWED_LIMIT + 5) {
            apply(
                &mut state,
                Action::RecordView(product.clone()),
                StockPolicy::Unchecked,
            );
        }
        assert!(state.recently_viewed.len() <= RECENTLY_VIEWED_LIMIT);

        let first = products[0].clone();
        apply(
            &mut state,
            Action::RecordView(first.clone()),
            StockPolicy::Unchecked,
        );
        assert_eq!(state.recently_viewed[0].id, first.id);
        assert_eq!(
            state
                .recently_viewed
                .iter()
                .filter(|p| p.id == first.id)
                .count(),
            1
        );
    }
}
