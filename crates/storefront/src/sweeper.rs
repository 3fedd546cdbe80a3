//! Background cleanup of abandoned orders.
//!
//! Checkout writes a pending order before the payment widget opens. When the
//! customer walks away the order would stay pending forever; the sweeper
//! marks pending orders older than the configured TTL as failed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::content::{ContentError, ContentStore};

/// Marks stale pending orders as failed.
#[derive(Debug, Clone)]
pub struct PendingOrderSweeper<C> {
    content: C,
    ttl: Duration,
}

impl<C: ContentStore> PendingOrderSweeper<C> {
    #[must_use]
    pub const fn new(content: C, ttl: Duration) -> Self {
        Self { content, ttl }
    }

    /// Fail every order still pending `ttl` after it was created. Returns how
    /// many were failed.
    ///
    /// Orders that settle between the read and the write are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pending orders cannot be read.
    #[instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, ContentError> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let cutoff = now.checked_sub_signed(ttl).unwrap_or(DateTime::<Utc>::MIN_UTC);

        let stale = self.content.pending_orders_before(cutoff).await?;
        let mut failed = 0;
        for order in &stale {
            match self.content.mark_order_failed(&order.order_id).await {
                Ok(()) => failed += 1,
                Err(ContentError::Transition(e)) => {
                    debug!(order_id = %order.order_id, "Order settled before sweep: {e}");
                }
                Err(e) => warn!(order_id = %order.order_id, error = %e, "Failed to expire order"),
            }
        }

        if failed > 0 {
            info!(failed, "Expired abandoned pending orders");
        }
        Ok(failed)
    }
}

impl<C: ContentStore + 'static> PendingOrderSweeper<C> {
    /// Run [`sweep`](Self::sweep) every `interval` until the handle is aborted.
    #[must_use]
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                timer.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    warn!(error = %e, "Pending order sweep failed");
                }
            }
        })
    }
}
