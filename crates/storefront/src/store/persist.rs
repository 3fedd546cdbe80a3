//! Persistence of the client store.
//!
//! [`Persister`] is a [`StoreObserver`]: the store notifies it after every
//! committed transition and it writes the changed slice under its key.
//! Hydration reads each key independently so one corrupt value never costs
//! the others.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::state::{Slice, StoreState};
use super::storage::{Storage, StorageError};

/// Storage key holding the cart lines.
pub const CART_KEY: &str = "ambre.cart.v1";
/// Storage key holding the wishlist entries.
pub const WISHLIST_KEY: &str = "ambre.wishlist.v1";
/// Storage key holding the recently viewed products.
pub const RECENTLY_VIEWED_KEY: &str = "ambre.recently_viewed.v1";

impl Slice {
    /// Storage key for this slice.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Cart => CART_KEY,
            Self::Wishlist => WISHLIST_KEY,
            Self::RecentlyViewed => RECENTLY_VIEWED_KEY,
        }
    }
}

/// Receives committed transitions from a `ClientStore`.
pub trait StoreObserver: Send + Sync {
    /// Called after `slice` changed; `state` is the state after the change.
    fn committed(&self, slice: Slice, state: &StoreState);
}

/// Writes changed slices to durable storage.
#[derive(Clone)]
pub struct Persister {
    storage: Arc<dyn Storage>,
}

impl Persister {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Serialize and write one slice.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    pub fn write(&self, slice: Slice, state: &StoreState) -> Result<(), StorageError> {
        let json = match slice {
            Slice::Cart => serde_json::to_string(&state.cart)?,
            Slice::Wishlist => serde_json::to_string(&state.wishlist)?,
            Slice::RecentlyViewed => serde_json::to_string(&state.recently_viewed)?,
        };
        self.storage.set(slice.storage_key(), &json)
    }

    /// Build the initial state from storage.
    ///
    /// Missing keys start empty. Unreadable or corrupt values are logged and
    /// also start empty.
    #[must_use]
    pub fn hydrate(&self) -> StoreState {
        let stored = StoreState {
            cart: self.read_slice(Slice::Cart),
            wishlist: self.read_slice(Slice::Wishlist),
            recently_viewed: self.read_slice(Slice::RecentlyViewed),
        };
        let state = stored.clone().normalized();

        if state.cart != stored.cart {
            warn!(key = CART_KEY, "Repaired persisted cart lines");
        }
        if state.wishlist != stored.wishlist {
            warn!(key = WISHLIST_KEY, "Repaired persisted wishlist");
        }
        if state.recently_viewed != stored.recently_viewed {
            warn!(key = RECENTLY_VIEWED_KEY, "Repaired persisted recently viewed list");
        }
        state
    }

    fn read_slice<T: DeserializeOwned>(&self, slice: Slice) -> Vec<T> {
        let key = slice.storage_key();
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted store slice");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt persisted store slice");
                Vec::new()
            }
        }
    }
}

impl StoreObserver for Persister {
    fn committed(&self, slice: Slice, state: &StoreState) {
        match self.write(slice, state) {
            Ok(()) => debug!(key = slice.storage_key(), "Persisted store slice"),
            Err(e) => warn!(
                key = slice.storage_key(),
                error = %e,
                "Failed to persist store slice"
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ambre_core::{CartLine, Price, ProductId};

    use super::*;
    use crate::store::storage::MemoryStorage;

    fn state() -> StoreState {
        StoreState {
            cart: vec![CartLine {
                product_id: ProductId::new("p1"),
                name: "Amber Nuit".to_string(),
                unit_price: Price::from_rupees(500),
                quantity: 2,
                selected_variant: Some("50ml".to_string()),
                image_ref: "/img/p1.jpg".to_string(),
                stock: Some(5),
            }],
            wishlist: Vec::new(),
            recently_viewed: Vec::new(),
        }
    }

    #[test]
    fn test_write_then_hydrate() {
        let storage = MemoryStorage::new();
        let persister = Persister::new(Arc::new(storage.clone()));
        persister.write(Slice::Cart, &state()).unwrap();

        assert!(storage.get(CART_KEY).unwrap().unwrap().starts_with('['));
        assert_eq!(persister.hydrate(), state());
    }

    #[test]
    fn test_corrupt_slice_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set(CART_KEY, "{not json").unwrap();
        storage.set(WISHLIST_KEY, "[]").unwrap();

        let hydrated = Persister::new(Arc::new(storage)).hydrate();
        assert!(hydrated.cart.is_empty());
        assert!(hydrated.wishlist.is_empty());
    }

    #[test]
    fn test_hydrate_drops_zero_and_merges_duplicate_lines() {
        let storage = MemoryStorage::new();
        let line = |quantity: u32| {
            let mut line = state().cart.remove(0);
            line.quantity = quantity;
            line
        };
        storage
            .set(
                CART_KEY,
                &serde_json::to_string(&[line(0), line(3), line(4)]).unwrap(),
            )
            .unwrap();

        let hydrated = Persister::new(Arc::new(storage)).hydrate();
        let quantities: Vec<u32> = hydrated.cart.iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, [7]);
    }

    #[test]
    fn test_keys_are_distinct() {
        let keys = [CART_KEY, WISHLIST_KEY, RECENTLY_VIEWED_KEY];
        assert_eq!(
            keys.iter().collect::<std::collections::HashSet<_>>().len(),
            3
        );
    }
}
