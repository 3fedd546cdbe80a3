//! Payment gateways.
//!
//! Checkout awaits [`PaymentGateway::open`] and receives a
//! [`PaymentOutcome`]. Development builds use [`MockGateway`]; production
//! uses [`HostedCheckout`], which hands the payment widget to the UI through
//! a [`WidgetBridge`].

mod hosted;
mod mock;

use std::future::Future;

use ambre_core::{CURRENCY_CODE, OrderId, PaymentReceipt, PriceError};
use serde::Serialize;
use thiserror::Error;

use crate::config::{Environment, StorefrontConfig};

pub use hosted::{HostedCheckout, WidgetBridge, WidgetLaunch, WidgetOptions, WidgetResponse};
pub use mock::MockGateway;

/// Brand shown in the payment widget.
pub const BRAND_NAME: &str = "Maison Ambre";

/// Errors that can occur while opening a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Amount cannot be expressed in paise.
    #[error("invalid amount: {0}")]
    Amount(#[from] PriceError),

    /// Gateway credentials are missing.
    #[error("payment gateway not configured: {0}")]
    NotConfigured(&'static str),

    /// Nobody is listening for widget launches.
    #[error("payment widget is not available")]
    BridgeClosed,
}

/// Customer details pre-filled in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// What to charge and how to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount in paise.
    pub amount: u64,
    pub currency: &'static str,
    /// Our order id, passed to the gateway as its receipt reference.
    pub order_reference: OrderId,
    pub prefill: Prefill,
    pub theme_color: String,
    pub brand_name: String,
    pub description: String,
}

impl PaymentRequest {
    /// An INR request for `amount` paise.
    #[must_use]
    pub fn inr(
        amount: u64,
        order_reference: OrderId,
        prefill: Prefill,
        theme_color: impl Into<String>,
    ) -> Self {
        let description = format!("Order {order_reference}");
        Self {
            amount,
            currency: CURRENCY_CODE,
            order_reference,
            prefill,
            theme_color: theme_color.into(),
            brand_name: BRAND_NAME.to_owned(),
            description,
        }
    }
}

/// How the payment attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded(PaymentReceipt),
    Failed { reason: String },
    /// The customer closed the widget.
    Cancelled,
}

/// A payment gateway.
pub trait PaymentGateway: Send + Sync {
    /// Present the payment to the customer and wait for the result.
    fn open(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<PaymentOutcome, PaymentError>> + Send;
}

/// The gateway selected for an environment.
#[derive(Clone)]
pub enum Gateway {
    Mock(MockGateway),
    Hosted(HostedCheckout),
}

impl Gateway {
    /// Mock gateway in development, hosted checkout in production. The
    /// bridge is returned for the UI to drive when the hosted gateway is
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotConfigured` if production credentials are
    /// missing.
    pub fn for_environment(
        config: &StorefrontConfig,
    ) -> Result<(Self, Option<WidgetBridge>), PaymentError> {
        match config.environment {
            Environment::Production => {
                let (gateway, bridge) = HostedCheckout::new(&config.payment)?;
                Ok((Self::Hosted(gateway), Some(bridge)))
            }
            Environment::Development => Ok((
                Self::Mock(MockGateway::new(config.payment.mock_delay)),
                None,
            )),
        }
    }
}

impl PaymentGateway for Gateway {
    async fn open(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        match self {
            Self::Mock(gateway) => gateway.open(request).await,
            Self::Hosted(gateway) => gateway.open(request).await,
        }
    }
}
