//! Hosted checkout: the gateway's browser widget, driven through a bridge.
//!
//! [`HostedCheckout::open`] creates a gateway order over HTTPS, then
//! publishes a [`WidgetLaunch`] and waits. The UI takes launches from its
//! [`WidgetBridge`], shows the widget with [`WidgetLaunch::options`] and
//! answers exactly once. A launch dropped without an answer counts as the
//! customer closing the widget.

use std::sync::Arc;

use ambre_core::PaymentReceipt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{info, instrument, warn};

use super::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest, Prefill};
use crate::config::PaymentConfig;

/// Gateway order as returned by `POST /v1/orders`.
#[derive(Debug, Deserialize)]
struct GatewayOrder {
    id: String,
}

/// Options the browser widget is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme: WidgetTheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTheme {
    pub color: String,
}

/// The widget's success payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WidgetResponse {
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(rename = "razorpay_order_id")]
    pub order_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug)]
enum WidgetResult {
    Succeeded(WidgetResponse),
    Failed(String),
    Dismissed,
}

/// One pending widget presentation.
#[derive(Debug)]
pub struct WidgetLaunch {
    options: WidgetOptions,
    responder: oneshot::Sender<WidgetResult>,
}

impl WidgetLaunch {
    #[must_use]
    pub const fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// The customer completed payment.
    pub fn succeed(self, response: WidgetResponse) {
        self.answer(WidgetResult::Succeeded(response));
    }

    /// The widget reported a payment failure.
    pub fn fail(self, reason: impl Into<String>) {
        self.answer(WidgetResult::Failed(reason.into()));
    }

    /// The customer closed the widget.
    pub fn dismiss(self) {
        self.answer(WidgetResult::Dismissed);
    }

    fn answer(self, result: WidgetResult) {
        if self.responder.send(result).is_err() {
            warn!(order_id = %self.options.order_id, "Payment widget answered after checkout stopped waiting");
        }
    }
}

/// UI end of the hosted checkout.
#[derive(Debug)]
pub struct WidgetBridge {
    launches: mpsc::Receiver<WidgetLaunch>,
}

impl WidgetBridge {
    /// Wait for the next widget to show. `None` once the gateway is gone.
    pub async fn next_launch(&mut self) -> Option<WidgetLaunch> {
        self.launches.recv().await
    }
}

/// Production gateway backed by the hosted payment widget.
#[derive(Clone)]
pub struct HostedCheckout {
    inner: Arc<HostedCheckoutInner>,
}

struct HostedCheckoutInner {
    client: reqwest::Client,
    orders_endpoint: String,
    key_id: String,
    key_secret: SecretString,
    launches: mpsc::Sender<WidgetLaunch>,
    // One widget at a time.
    presenting: Mutex<()>,
}

impl HostedCheckout {
    /// Create the gateway and the bridge the UI listens on.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotConfigured` if the key id or secret is missing.
    pub fn new(config: &PaymentConfig) -> Result<(Self, WidgetBridge), PaymentError> {
        let key_id = config
            .key_id
            .clone()
            .ok_or(PaymentError::NotConfigured("PAYMENT_KEY_ID"))?;
        let key_secret = config
            .key_secret
            .clone()
            .ok_or(PaymentError::NotConfigured("PAYMENT_KEY_SECRET"))?;

        let (sender, receiver) = mpsc::channel(1);

        let gateway = Self {
            inner: Arc::new(HostedCheckoutInner {
                client: reqwest::Client::new(),
                orders_endpoint: format!("{}/v1/orders", config.base_url.trim_end_matches('/')),
                key_id,
                key_secret,
                launches: sender,
                presenting: Mutex::new(()),
            }),
        };

        Ok((gateway, WidgetBridge { launches: receiver }))
    }

    async fn create_gateway_order(&self, request: &PaymentRequest) -> Result<GatewayOrder, PaymentError> {
        let response = self
            .inner
            .client
            .post(&self.inner.orders_endpoint)
            .basic_auth(&self.inner.key_id, Some(self.inner.key_secret.expose_secret()))
            .json(&json!({
                "amount": request.amount,
                "currency": request.currency,
                "receipt": request.order_reference,
                "notes": { "order_id": request.order_reference },
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Payment gateway returned non-success status"
            );
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl PaymentGateway for HostedCheckout {
    #[instrument(skip(self, request), fields(order_id = %request.order_reference, amount = request.amount))]
    async fn open(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        let _presenting = self.inner.presenting.lock().await;

        let gateway_order = self.create_gateway_order(&request).await?;
        info!(gateway_order_id = %gateway_order.id, "Gateway order created");

        let (responder, answer) = oneshot::channel();
        let launch = WidgetLaunch {
            options: WidgetOptions {
                key: self.inner.key_id.clone(),
                amount: request.amount,
                currency: request.currency.to_owned(),
                name: request.brand_name,
                description: request.description,
                order_id: gateway_order.id.clone(),
                prefill: request.prefill,
                theme: WidgetTheme {
                    color: request.theme_color,
                },
            },
            responder,
        };

        self.inner
            .launches
            .send(launch)
            .await
            .map_err(|_| PaymentError::BridgeClosed)?;

        let outcome = match answer.await {
            Ok(WidgetResult::Succeeded(response)) if response.order_id != gateway_order.id => {
                warn!(
                    expected = %gateway_order.id,
                    received = %response.order_id,
                    "Widget answered for a different gateway order"
                );
                PaymentOutcome::Failed {
                    reason: "Payment response did not match this order".to_owned(),
                }
            }
            Ok(WidgetResult::Succeeded(response)) => PaymentOutcome::Succeeded(PaymentReceipt {
                payment_id: response.payment_id,
                gateway_order_id: response.order_id,
                signature: response.signature,
            }),
            Ok(WidgetResult::Failed(reason)) => PaymentOutcome::Failed { reason },
            Ok(WidgetResult::Dismissed) | Err(_) => PaymentOutcome::Cancelled,
        };

        Ok(outcome)
    }
}
