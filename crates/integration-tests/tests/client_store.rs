//! Cart, wishlist and recently viewed behaviour, and persistence across
//! sessions on disk.

#![allow(clippy::indexing_slicing)]

use std::collections::HashSet;
use std::sync::Arc;

use ambre_core::Price;
use ambre_integration_tests::{customer, product};
use ambre_storefront::catalog::sample_catalog;
use ambre_storefront::store::{ClientStore, FileStorage, RECENTLY_VIEWED_LIMIT, StockPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_cart_arithmetic_over_a_session() {
    let mut store = ClientStore::in_memory();
    let oud = product(0, 500);
    let jasmine = product(1, 1200);

    store.add_to_cart(&oud, 2, None);
    store.add_to_cart(&oud, 1, None);
    store.add_to_cart(&oud, 1, Some("100ml"));
    store.add_to_cart(&jasmine, 1, Some("50ml"));
    assert_eq!(store.cart().len(), 3);
    assert_eq!(store.count(), 5);
    assert_eq!(store.subtotal(), Price::from_rupees(500 * 4 + 1200));

    store.update_quantity(&oud.id, 5, None);
    assert_eq!(store.count(), 7);

    // Below one is a no-op, as is touching a line that does not exist.
    store.update_quantity(&oud.id, 0, None);
    store.remove_from_cart(&jasmine.id, Some("100ml"));
    store.add_to_cart(&jasmine, 0, None);
    assert_eq!(store.count(), 7);

    store.remove_from_cart(&oud.id, Some("100ml"));
    assert_eq!(store.count(), 6);
    assert_eq!(store.subtotal(), Price::from_rupees(500 * 5 + 1200));

    store.clear_cart();
    assert!(store.is_cart_empty());
    assert_eq!(store.subtotal(), Price::from_rupees(0));
}

#[test]
fn test_random_sequences_keep_cart_consistent() {
    let catalog = sample_catalog();
    let variants = [None, Some("50ml"), Some("100ml")];

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = ClientStore::in_memory();

        for _ in 0..200 {
            let product = &catalog[rng.random_range(0..catalog.len())];
            let variant = variants[rng.random_range(0..variants.len())];
            let quantity = rng.random_range(0..5);
            match rng.random_range(0..4) {
                0 | 1 => store.add_to_cart(product, quantity, variant),
                2 => store.update_quantity(&product.id, quantity, variant),
                _ => store.remove_from_cart(&product.id, variant),
            }

            assert!(store.cart().iter().all(|line| line.quantity >= 1), "seed {seed}");
            assert_eq!(
                store.count(),
                store.cart().iter().map(|line| u64::from(line.quantity)).sum::<u64>()
            );
            let keys: HashSet<_> = store.cart().iter().map(|line| line.key()).collect();
            assert_eq!(keys.len(), store.cart().len(), "duplicate line, seed {seed}");
        }
    }
}

#[test]
fn test_stock_clamp_policy() {
    let mut perfume = product(2, 900);
    perfume.stock = 3;

    let mut store = ClientStore::in_memory().with_stock_policy(StockPolicy::Clamp);
    store.add_to_cart(&perfume, 10, None);
    assert_eq!(store.count(), 3);

    let mut unchecked = ClientStore::in_memory();
    unchecked.add_to_cart(&perfume, 10, None);
    assert_eq!(unchecked.count(), 10);
}

#[test]
fn test_wishlist_and_recently_viewed() {
    let catalog = sample_catalog();
    let mut store = ClientStore::in_memory();

    let first = catalog.first().unwrap();
    assert!(store.toggle_wishlist(first));
    store.add_to_wishlist(first);
    assert_eq!(store.wishlist().len(), 1);
    assert!(!store.toggle_wishlist(first));
    assert!(store.wishlist().is_empty());

    for product in &catalog {
        store.record_view(product);
    }
    store.record_view(first);

    let viewed = store.recently_viewed();
    assert_eq!(viewed.len(), catalog.len().min(RECENTLY_VIEWED_LIMIT));
    assert_eq!(viewed.first().map(|p| &p.id), Some(&first.id));
    assert_eq!(viewed.iter().filter(|p| p.id == first.id).count(), 1);
}

#[test]
fn test_state_survives_restart_but_session_does_not() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = sample_catalog();

    {
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let mut store = ClientStore::persistent(storage);
        store.set_user(Some(customer()));
        store.add_to_cart(&product(0, 500), 2, Some("50ml"));
        store.add_to_wishlist(catalog.last().unwrap());
        store.record_view(catalog.first().unwrap());
        store.search("oud", &catalog);
    }

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let store = ClientStore::persistent(storage);

    assert_eq!(store.count(), 2);
    assert_eq!(store.subtotal(), Price::from_rupees(1000));
    assert_eq!(store.cart().first().unwrap().selected_variant.as_deref(), Some("50ml"));
    assert_eq!(store.wishlist().len(), 1);
    assert_eq!(store.recently_viewed().len(), 1);

    // Sign-in and search belong to the session only.
    assert!(!store.is_authenticated());
    assert!(store.search_results().is_empty());
    assert_eq!(store.search_query(), "");
}

#[test]
fn test_search_results_follow_query() {
    let catalog = sample_catalog();
    let mut store = ClientStore::in_memory();

    let found: Vec<String> = store
        .search("OUD", &catalog)
        .iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(found, ["oud-royale", "rose-attar"]);
    assert_eq!(store.search_query(), "OUD");

    assert!(store.search("   ", &catalog).is_empty());
}
