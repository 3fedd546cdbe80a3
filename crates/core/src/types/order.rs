//! Orders created at checkout.
//!
//! An order is written to the content store as `pending` before payment is
//! attempted. From there it moves exactly once: to `paid` when the gateway
//! confirms payment, or to `failed` when an abandoned order is swept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::ShippingAddress;
use super::cart::CartLine;
use super::id::{OrderId, ProductId, UserId};
use super::price::Price;
use super::status::PaymentStatus;

/// Errors raised by an invalid status transition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderTransitionError {
    /// The order already reached a final status.
    #[error("order {order_id} is already {status}")]
    AlreadySettled {
        order_id: OrderId,
        status: PaymentStatus,
    },
}

/// A purchased line, with the price at the moment of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<String>,
    pub image_ref: String,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            selected_variant: line.selected_variant.clone(),
            image_ref: line.image_ref.clone(),
        }
    }
}

/// Identifiers the payment gateway hands back on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub gateway_order_id: String,
    pub signature: String,
}

/// An order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub customer_email: String,
    pub lines: Vec<OrderLine>,
    pub subtotal: Price,
    pub shipping_address: ShippingAddress,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<PaymentReceipt>,
}

impl Order {
    /// Snapshot the cart into a new pending order.
    #[must_use]
    pub fn pending(
        order_id: OrderId,
        user_id: UserId,
        customer_email: String,
        cart: &[CartLine],
        shipping_address: ShippingAddress,
        created_at: DateTime<Utc>,
    ) -> Self {
        let lines: Vec<OrderLine> = cart.iter().map(OrderLine::from).collect();
        let subtotal = lines.iter().map(OrderLine::line_total).sum();

        Self {
            order_id,
            user_id,
            customer_email,
            lines,
            subtotal,
            shipping_address,
            payment_status: PaymentStatus::Pending,
            created_at,
            paid_at: None,
            receipt: None,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Record a successful payment.
    ///
    /// # Errors
    ///
    /// Returns `OrderTransitionError::AlreadySettled` unless the order is pending.
    pub fn mark_paid(
        &mut self,
        receipt: PaymentReceipt,
        paid_at: DateTime<Utc>,
    ) -> Result<(), OrderTransitionError> {
        self.ensure_pending()?;
        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(paid_at);
        self.receipt = Some(receipt);
        Ok(())
    }

    /// Give up on an order whose payment never completed.
    ///
    /// # Errors
    ///
    /// Returns `OrderTransitionError::AlreadySettled` unless the order is pending.
    pub fn mark_failed(&mut self) -> Result<(), OrderTransitionError> {
        self.ensure_pending()?;
        self.payment_status = PaymentStatus::Failed;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), OrderTransitionError> {
        if self.payment_status.is_terminal() {
            return Err(OrderTransitionError::AlreadySettled {
                order_id: self.order_id.clone(),
                status: self.payment_status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::address::IndianState;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Arjun Mehta".to_string(),
            email: "arjun@example.in".to_string(),
            phone: "9876543210".to_string(),
            address: "4 Marine Drive".to_string(),
            city: "Mumbai".to_string(),
            state: IndianState::Maharashtra,
            pincode: "400020".to_string(),
        }
    }

    fn line(id: &str, price: u32, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: id.to_uppercase(),
            unit_price: Price::from_rupees(price),
            quantity,
            selected_variant: None,
            image_ref: String::new(),
            stock: None,
        }
    }

    fn order() -> Order {
        Order::pending(
            OrderId::new("ORD-1"),
            UserId::new("uid-1"),
            "arjun@example.in".to_string(),
            &[line("p1", 500, 2), line("p2", 1250, 1)],
            address(),
            Utc::now(),
        )
    }

    #[test]
    fn test_pending_computes_subtotal() {
        let order = order();
        assert_eq!(order.subtotal, Price::from_rupees(2250));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_item_count_does_not_overflow() {
        let order = Order::pending(
            OrderId::new("ORD-2"),
            UserId::new("uid-1"),
            "arjun@example.in".to_string(),
            &[line("p1", 500, u32::MAX), line("p2", 1250, 1)],
            address(),
            Utc::now(),
        );
        assert_eq!(order.item_count(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_mark_paid_once() {
        let mut order = order();
        let receipt = PaymentReceipt {
            payment_id: "pay_1".to_string(),
            gateway_order_id: "order_1".to_string(),
            signature: "sig".to_string(),
        };
        order.mark_paid(receipt.clone(), Utc::now()).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.receipt.as_ref(), Some(&receipt));

        assert!(matches!(
            order.mark_failed(),
            Err(OrderTransitionError::AlreadySettled {
                status: PaymentStatus::Paid,
                ..
            })
        ));
        assert!(order.mark_paid(receipt, Utc::now()).is_err());
    }

    #[test]
    fn test_mark_failed() {
        let mut order = order();
        order.mark_failed().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert!(order.paid_at.is_none());
    }

    #[test]
    fn test_serialized_document_fields() {
        let json = serde_json::to_value(order()).unwrap();
        assert_eq!(json["orderId"], "ORD-1");
        assert_eq!(json["paymentStatus"], "pending");
        assert_eq!(json["shippingAddress"]["state"], "Maharashtra");
        assert!(json.get("receipt").is_none());
    }
}
