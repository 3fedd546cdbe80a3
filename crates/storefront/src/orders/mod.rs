//! Order history for customers and the shop owner.
//!
//! Delivery status is not stored anywhere: it is derived from the order's
//! age each time an order is read, and only for paid orders.

mod admin;

use ambre_core::{DeliveryStatus, Order, OrderId, PaymentStatus, UserId, derive_status};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::content::{ContentError, ContentStore};

pub use admin::{AdminDashboard, DashboardSummary, RecentOrderView};

/// An order with its derived delivery status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    pub order: Order,
    /// `None` unless the order is paid.
    pub delivery: Option<DeliveryStatus>,
}

impl TrackedOrder {
    #[must_use]
    pub fn at(order: Order, now: DateTime<Utc>) -> Self {
        let delivery = (order.payment_status == PaymentStatus::Paid)
            .then(|| derive_status(order.created_at, now));
        Self { order, delivery }
    }
}

/// Customer-facing order lookups.
#[derive(Debug, Clone)]
pub struct OrderTracker<C> {
    content: C,
}

impl<C: ContentStore> OrderTracker<C> {
    #[must_use]
    pub const fn new(content: C) -> Self {
        Self { content }
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the content store cannot be read.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn orders_for(&self, user: &UserId) -> Result<Vec<TrackedOrder>, ContentError> {
        let now = Utc::now();
        Ok(self
            .content
            .orders_for_user(user)
            .await?
            .into_iter()
            .map(|order| TrackedOrder::at(order, now))
            .collect())
    }

    /// One order, e.g. for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns an error if the content store cannot be read.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Option<TrackedOrder>, ContentError> {
        let now = Utc::now();
        Ok(self
            .content
            .fetch_order(id)
            .await?
            .map(|order| TrackedOrder::at(order, now)))
    }
}
