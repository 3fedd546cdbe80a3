//! Maison Ambre Core - Shared domain types.
//!
//! This crate provides the types used across the Maison Ambre storefront:
//! - `storefront` - Client store, catalog, checkout workflow and service clients
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. Everything here can be used from tests without a
//! runtime.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, products, cart lines, orders, shipping
//!   addresses and the derived delivery status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
