//! Checkout: from the shipping form to a paid order.
//!
//! ```text
//! Idle → Validating → Submitting → AwaitingPayment → Completed
//!            │                           │
//!            └── invalid form ──→ Idle ←─┴── payment failed / cancelled
//! ```
//!
//! The order is written to the content store as `pending` before the
//! gateway is opened. The cart is cleared if and only if the payment
//! succeeds; every other path leaves it untouched so the customer can retry.

mod notice;
mod order_id;

use std::sync::atomic::{AtomicBool, Ordering};

use ambre_core::{FieldErrors, Order, OrderId, PriceError, ShippingForm};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::content::{ContentError, ContentStore};
use crate::error::{StorefrontError, add_breadcrumb};
use crate::identity::LoginRedirect;
use crate::payment::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest, Prefill};
use crate::store::ClientStore;

pub use notice::{Notice, NoticeLevel};
pub use order_id::generate_order_id;

/// Path of the confirmation page for an order.
#[must_use]
pub fn confirmation_path(order_id: &OrderId) -> String {
    format!("/order-confirmation/{order_id}")
}

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    AwaitingPayment,
    Completed,
}

/// Reasons a checkout did not reach the payment widget (or could not).
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another submission from this workflow is still running.
    #[error("a checkout is already in progress")]
    AlreadySubmitting,

    #[error("the cart is empty")]
    EmptyCart,

    /// The customer must sign in first; resume at the redirect afterwards.
    #[error("sign-in required")]
    LoginRequired(LoginRedirect),

    /// One or more form fields are invalid.
    #[error("invalid shipping details: {0}")]
    Invalid(FieldErrors),

    /// The pending order could not be stored; no payment was attempted.
    #[error("order could not be created: {0}")]
    OrderNotCreated(#[source] ContentError),

    /// The gateway could not be opened; the order stays pending.
    #[error("payment could not be started: {0}")]
    Payment(#[from] PaymentError),

    #[error("invalid order amount: {0}")]
    Amount(#[from] PriceError),
}

impl CheckoutError {
    /// Toast for the customer.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::AlreadySubmitting => Notice::info("Your order is already being placed."),
            Self::EmptyCart => Notice::error("Your cart is empty."),
            Self::LoginRequired(_) => Notice::info("Please sign in to complete your purchase."),
            Self::Invalid(_) => Notice::error("Please correct the highlighted fields."),
            Self::OrderNotCreated(_) => {
                Notice::error("We couldn't place your order. Please try again.")
            }
            Self::Payment(_) | Self::Amount(_) => {
                Notice::error("We couldn't start the payment. Please try again.")
            }
        }
    }
}

/// How a submission that reached the gateway ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Paid. `recorded` is false when the order could not be marked paid
    /// afterwards; the fault has been reported for manual follow-up.
    Completed { order_id: OrderId, recorded: bool },
    PaymentFailed { order_id: OrderId, reason: String },
    Cancelled { order_id: OrderId },
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::Completed { order_id, .. }
            | Self::PaymentFailed { order_id, .. }
            | Self::Cancelled { order_id } => order_id,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Toast for the customer.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Completed { .. } => {
                Notice::success("Payment successful! Your order has been placed.")
            }
            Self::PaymentFailed { reason, .. } => {
                Notice::error(format!("Payment failed: {reason}. Your cart has been saved."))
            }
            Self::Cancelled { .. } => {
                Notice::info("Payment was cancelled. Your cart has been saved.")
            }
        }
    }

    /// Page to show next.
    #[must_use]
    pub fn navigate_to(&self) -> String {
        match self {
            Self::Completed { order_id, .. } => confirmation_path(order_id),
            Self::PaymentFailed { .. } | Self::Cancelled { .. } => {
                crate::identity::CHECKOUT_PATH.to_owned()
            }
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The checkout state machine.
pub struct CheckoutWorkflow<C, G> {
    content: C,
    gateway: G,
    theme_color: String,
    in_flight: AtomicBool,
    phase: watch::Sender<CheckoutPhase>,
}

impl<C: ContentStore, G: PaymentGateway> CheckoutWorkflow<C, G> {
    #[must_use]
    pub fn new(content: C, gateway: G, theme_color: impl Into<String>) -> Self {
        Self {
            content,
            gateway,
            theme_color: theme_color.into(),
            in_flight: AtomicBool::new(false),
            phase: watch::channel(CheckoutPhase::Idle).0,
        }
    }

    /// Check the form without submitting. Empty means valid.
    #[must_use]
    pub fn validate(form: &ShippingForm) -> FieldErrors {
        form.validate()
    }

    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.borrow()
    }

    /// Phase updates, for progress indicators.
    #[must_use]
    pub fn phases(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    /// Place an order for the store's cart and take payment.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` when the order never reached the payment
    /// widget. The cart is untouched in every error case.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        store: &mut ClientStore,
        form: &ShippingForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::AlreadySubmitting);
        }
        let _in_flight = InFlight(&self.in_flight);

        let result = self.run(store, form).await;
        let phase = match &result {
            Ok(outcome) if outcome.is_completed() => CheckoutPhase::Completed,
            _ => CheckoutPhase::Idle,
        };
        self.phase.send_replace(phase);
        result
    }

    async fn run(
        &self,
        store: &mut ClientStore,
        form: &ShippingForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if store.is_cart_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let Some(user) = store.user().cloned() else {
            return Err(CheckoutError::LoginRequired(LoginRedirect::checkout()));
        };

        self.phase.send_replace(CheckoutPhase::Validating);
        let address = form.clone().into_address().map_err(CheckoutError::Invalid)?;

        self.phase.send_replace(CheckoutPhase::Submitting);
        let now = Utc::now();
        let order = Order::pending(
            generate_order_id(now),
            user.user_id.clone(),
            user.email.to_string(),
            store.cart(),
            address,
            now,
        );
        let amount = order.subtotal.to_minor_units()?;

        if let Err(e) = self.content.create_order(&order).await {
            warn!(order_id = %order.order_id, error = %e, "Failed to create order");
            return Err(CheckoutError::OrderNotCreated(e));
        }
        let order_id = order.order_id;
        info!(order_id = %order_id, amount, items = store.count(), "Order created");
        add_breadcrumb("checkout", "Order created", Some(&[("order_id", order_id.as_str())]));

        self.phase.send_replace(CheckoutPhase::AwaitingPayment);
        let request = PaymentRequest::inr(
            amount,
            order_id.clone(),
            Prefill {
                name: order.shipping_address.name.clone(),
                email: order.shipping_address.email.clone(),
                contact: order.shipping_address.phone.clone(),
            },
            self.theme_color.clone(),
        );

        let outcome = match self.gateway.open(request).await? {
            PaymentOutcome::Succeeded(receipt) => {
                let recorded = match self
                    .content
                    .mark_order_paid(&order_id, &receipt, Utc::now())
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        // The customer has paid; the order needs fixing by hand.
                        StorefrontError::from(e).report();
                        false
                    }
                };
                store.clear_cart();
                info!(
                    order_id = %order_id,
                    payment_id = %receipt.payment_id,
                    recorded,
                    "Payment succeeded"
                );
                CheckoutOutcome::Completed { order_id, recorded }
            }
            PaymentOutcome::Failed { reason } => {
                warn!(order_id = %order_id, reason = %reason, "Payment failed");
                CheckoutOutcome::PaymentFailed { order_id, reason }
            }
            PaymentOutcome::Cancelled => {
                info!(order_id = %order_id, "Payment cancelled");
                CheckoutOutcome::Cancelled { order_id }
            }
        };

        add_breadcrumb(
            "checkout",
            "Payment finished",
            Some(&[("order_id", outcome.order_id().as_str())]),
        );
        Ok(outcome)
    }
}
