//! Maison Ambre storefront library.
//!
//! Everything a storefront front end needs below the UI layer:
//!
//! - [`store`]: client-side cart, wishlist and recently viewed state,
//!   persisted between sessions
//! - [`catalog`]: product lookups from the content store with a built-in
//!   sample catalog fallback
//! - [`identity`]: password and Google sign-in with post-login redirects
//! - [`checkout`]: shipping validation, order creation and payment
//! - [`orders`]: order history, delivery tracking and the admin dashboard
//! - [`sweeper`]: expiry of abandoned pending orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod boundary;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod content;
pub mod error;
pub mod identity;
pub mod orders;
pub mod payment;
pub mod store;
pub mod sweeper;
pub mod telemetry;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
