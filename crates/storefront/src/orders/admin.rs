//! Shop owner's dashboard summary.

use std::collections::HashSet;

use ambre_core::{Order, OrderId, PaymentStatus, Price};
use tracing::{error, instrument};

use crate::content::{ContentError, ContentStore};

/// Orders shown in the dashboard's recent list.
const RECENT_ORDERS: usize = 10;

/// One row of the recent orders table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentOrderView {
    pub order_id: OrderId,
    pub customer_name: String,
    pub total: String,
    pub status: PaymentStatus,
    pub items: u64,
}

impl From<&Order> for RecentOrderView {
    fn from(order: &Order) -> Self {
        let name = order.shipping_address.name.trim();
        Self {
            order_id: order.order_id.clone(),
            customer_name: if name.is_empty() {
                order.customer_email.clone()
            } else {
                name.to_owned()
            },
            total: order.subtotal.to_string(),
            status: order.payment_status,
            items: order.item_count(),
        }
    }
}

/// Dashboard metrics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub paid_orders: usize,
    pub pending_orders: usize,
    pub failed_orders: usize,
    /// Sum of paid orders' subtotals.
    pub revenue: Price,
    pub customers: usize,
    /// `None` when the product count could not be read.
    pub products: Option<usize>,
    pub recent_orders: Vec<RecentOrderView>,
}

impl DashboardSummary {
    fn from_orders(orders: &[Order]) -> Self {
        let count = |status: PaymentStatus| {
            orders
                .iter()
                .filter(|order| order.payment_status == status)
                .count()
        };

        let mut recent: Vec<&Order> = orders.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            total_orders: orders.len(),
            paid_orders: count(PaymentStatus::Paid),
            pending_orders: count(PaymentStatus::Pending),
            failed_orders: count(PaymentStatus::Failed),
            revenue: orders
                .iter()
                .filter(|order| order.payment_status == PaymentStatus::Paid)
                .map(|order| order.subtotal)
                .sum(),
            customers: orders
                .iter()
                .map(|order| &order.user_id)
                .collect::<HashSet<_>>()
                .len(),
            products: None,
            recent_orders: recent
                .into_iter()
                .take(RECENT_ORDERS)
                .map(RecentOrderView::from)
                .collect(),
        }
    }
}

/// Read-only admin views over the content store.
#[derive(Debug, Clone)]
pub struct AdminDashboard<C> {
    content: C,
}

impl<C: ContentStore> AdminDashboard<C> {
    #[must_use]
    pub const fn new(content: C) -> Self {
        Self { content }
    }

    /// Build the dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns an error if orders cannot be read. A failed product count is
    /// logged and reported as `None`.
    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ContentError> {
        let (orders, products) =
            tokio::join!(self.content.all_orders(), self.content.fetch_products());

        let mut summary = DashboardSummary::from_orders(&orders?);
        summary.products = match products {
            Ok(products) => Some(products.len()),
            Err(e) => {
                error!("Failed to fetch products: {e}");
                None
            }
        };
        Ok(summary)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if orders cannot be read.
    pub async fn orders(&self) -> Result<Vec<Order>, ContentError> {
        self.content.all_orders().await
    }
}
