//! Core types for the Maison Ambre storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod delivery;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use address::{Field, FieldErrors, IndianState, ShippingAddress, ShippingForm};
pub use cart::{CartLine, LineKey, WishlistEntry};
pub use delivery::{DeliveryStatus, derive_status};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderLine, OrderTransitionError, PaymentReceipt};
pub use price::{CURRENCY_CODE, Price, PriceError};
pub use product::{FragranceNotes, PLACEHOLDER_IMAGE, Product};
pub use status::PaymentStatus;
