use std::time::Duration;

use ambre_core::PaymentReceipt;
use chrono::Utc;
use tracing::{info, instrument};

use super::{PaymentError, PaymentGateway, PaymentOutcome, PaymentRequest};

/// Gateway for development: waits briefly, then reports success with
/// synthetic ids. Contacts nothing.
#[derive(Debug, Clone)]
pub struct MockGateway {
    delay: Duration,
}

impl MockGateway {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

impl PaymentGateway for MockGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_reference, amount = request.amount))]
    async fn open(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        tokio::time::sleep(self.delay).await;

        let stamp = Utc::now().timestamp_millis();
        info!("Mock payment succeeded");
        Ok(PaymentOutcome::Succeeded(PaymentReceipt {
            payment_id: format!("pay_mock_{stamp}"),
            gateway_order_id: format!("order_mock_{stamp}"),
            signature: format!("sig_mock_{stamp}"),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ambre_core::OrderId;

    use super::*;
    use crate::payment::Prefill;

    #[tokio::test]
    async fn test_succeeds_after_delay() {
        let gateway = MockGateway::new(Duration::from_millis(20));
        let request = PaymentRequest::inr(
            250_000,
            OrderId::new("ORD-1"),
            Prefill {
                name: "Meera".to_string(),
                email: "meera@example.in".to_string(),
                contact: "9876543210".to_string(),
            },
            "#C9A96E",
        );

        let started = std::time::Instant::now();
        let outcome = gateway.open(request).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));

        let PaymentOutcome::Succeeded(receipt) = outcome else {
            panic!("expected the mock payment to succeed");
        };
        assert!(receipt.payment_id.starts_with("pay_mock_"));
        assert!(receipt.gateway_order_id.starts_with("order_mock_"));
        assert!(receipt.signature.starts_with("sig_mock_"));
    }
}
