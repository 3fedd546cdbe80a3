//! Content store access: product catalog and order documents.
//!
//! # Architecture
//!
//! - [`ContentStore`] is the seam the catalog, checkout and order views use
//! - [`ContentClient`] talks to the hosted document store over HTTP with
//!   GROQ queries and JSON mutations, caching product reads via `moka`
//! - [`MemoryContentStore`] keeps everything in process for tests and
//!   offline development
//!
//! The content store owns orders once created; the client keeps only the
//! order id.

mod cache;
mod client;
mod documents;
mod memory;
pub mod queries;

use std::future::Future;

use ambre_core::{Order, OrderId, OrderTransitionError, PaymentReceipt, Product, ProductId, UserId};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use client::ContentClient;
pub use memory::MemoryContentStore;

/// Errors that can occur when talking to the content store.
#[derive(Debug, Error)]
pub enum ContentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("content API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the store.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A write was attempted without a write token.
    #[error("content store token is not configured")]
    MissingToken,

    /// The order cannot move to the requested status.
    #[error(transparent)]
    Transition(#[from] OrderTransitionError),

    /// The store cannot be reached.
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

/// Read and write access to product and order documents.
pub trait ContentStore: Send + Sync {
    /// All products in the catalog. May be empty.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ContentError>> + Send;

    /// One product by id.
    fn fetch_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<Product>, ContentError>> + Send;

    /// Store a new (pending) order document.
    fn create_order(&self, order: &Order) -> impl Future<Output = Result<(), ContentError>> + Send;

    /// Move an order to `paid` and attach the gateway receipt.
    fn mark_order_paid(
        &self,
        id: &OrderId,
        receipt: &PaymentReceipt,
        paid_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), ContentError>> + Send;

    /// Move a pending order to `failed`.
    fn mark_order_failed(&self, id: &OrderId)
    -> impl Future<Output = Result<(), ContentError>> + Send;

    /// One order by id.
    fn fetch_order(
        &self,
        id: &OrderId,
    ) -> impl Future<Output = Result<Option<Order>, ContentError>> + Send;

    /// A customer's orders, newest first.
    fn orders_for_user(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Order>, ContentError>> + Send;

    /// Every order, newest first.
    fn all_orders(&self) -> impl Future<Output = Result<Vec<Order>, ContentError>> + Send;

    /// Pending orders created before `cutoff`.
    fn pending_orders_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Order>, ContentError>> + Send;
}
