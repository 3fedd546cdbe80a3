//! Integration tests for the Maison Ambre storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ambre-integration-tests
//! ```
//!
//! Everything runs in-process: the content store is the in-memory
//! implementation and remote services are stood in for by `wiremock`.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to paid order, including failure paths
//! - `client_store` - Cart and wishlist behaviour and persistence
//! - `hosted_checkout` - Checkout through the hosted payment widget
//! - `order_tracking` - Order history, delivery status and expiry

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use ambre_core::{Email, Price, Product, ShippingForm, UserId};
use ambre_storefront::catalog::sample_catalog;
use ambre_storefront::identity::{AuthMethod, Identity};
use ambre_storefront::payment::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};
use ambre_storefront::store::ClientStore;

/// A sample product re-priced for easy arithmetic.
#[must_use]
pub fn product(index: usize, rupees: u32) -> Product {
    let mut product = sample_catalog().into_iter().nth(index).unwrap();
    product.price = Price::from_rupees(rupees);
    product
}

/// A signed-in customer.
#[must_use]
pub fn customer() -> Identity {
    Identity {
        user_id: UserId::new("user-meera"),
        email: Email::parse("meera@example.in").unwrap(),
        display_name: Some("Meera Iyer".to_string()),
        method: AuthMethod::Password,
    }
}

/// An in-memory store with [`customer`] signed in.
#[must_use]
pub fn signed_in_store() -> ClientStore {
    let mut store = ClientStore::in_memory();
    store.set_user(Some(customer()));
    store
}

/// A shipping form that passes validation.
#[must_use]
pub fn shipping_form() -> ShippingForm {
    ShippingForm {
        name: "Meera Iyer".to_string(),
        email: "meera@example.in".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
    }
}

/// Gateway that always ends the same way.
#[derive(Debug, Clone)]
pub struct ScriptedGateway(pub PaymentOutcome);

impl PaymentGateway for ScriptedGateway {
    async fn open(&self, _request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        Ok(self.0.clone())
    }
}
