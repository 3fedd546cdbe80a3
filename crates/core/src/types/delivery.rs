//! Delivery status derived from an order's age.
//!
//! There is no carrier integration. Shipping progress is approximated from
//! the whole days elapsed since the order was created, recomputed on every
//! read and never stored.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Approximate shipping progress of a paid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    OrderConfirmed,
    InTransit,
    OutForDeliverySoon,
    OutForDelivery,
    Delivered,
}

impl DeliveryStatus {
    /// Customer-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OrderConfirmed => "Order Confirmed",
            Self::InTransit => "In Transit",
            Self::OutForDeliverySoon => "Out for Delivery Soon",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// Position on the tracking timeline, starting at 0.
    #[must_use]
    pub const fn step(self) -> u8 {
        match self {
            Self::OrderConfirmed => 0,
            Self::InTransit => 1,
            Self::OutForDeliverySoon => 2,
            Self::OutForDelivery => 3,
            Self::Delivered => 4,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the delivery status of an order created at `created_at`.
///
/// Elapsed time is truncated to whole days; a `created_at` in the future
/// (clock skew) counts as day zero.
///
/// ```
/// use ambre_core::{DeliveryStatus, derive_status};
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert_eq!(derive_status(now - Duration::days(1), now), DeliveryStatus::OrderConfirmed);
/// assert_eq!(derive_status(now - Duration::days(11), now), DeliveryStatus::Delivered);
/// ```
#[must_use]
pub fn derive_status(created_at: DateTime<Utc>, now: DateTime<Utc>) -> DeliveryStatus {
    let days = (now - created_at).num_days().max(0);
    match days {
        0..2 => DeliveryStatus::OrderConfirmed,
        2..5 => DeliveryStatus::InTransit,
        5..9 => DeliveryStatus::OutForDeliverySoon,
        9..=10 => DeliveryStatus::OutForDelivery,
        _ => DeliveryStatus::Delivered,
    }
}
