//! In-process content store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ambre_core::{Order, OrderId, PaymentReceipt, PaymentStatus, Product, ProductId, UserId};
use chrono::{DateTime, Utc};

use super::{ContentError, ContentStore};

#[derive(Default)]
struct Documents {
    products: Vec<Product>,
    orders: HashMap<OrderId, Order>,
}

/// Content store held in memory. Clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    documents: Arc<Mutex<Documents>>,
    offline: Arc<AtomicBool>,
}

impl MemoryContentStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with products.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        if let Ok(mut documents) = store.documents.lock() {
            documents.products = products;
        }
        store
    }

    /// Make every call fail with `ContentError::Unavailable` until switched
    /// back on.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert or replace an order directly.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Unavailable` if the store is offline.
    pub fn put_order(&self, order: Order) -> Result<(), ContentError> {
        self.lock()?.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>, ContentError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ContentError::Unavailable("store is offline".to_string()));
        }
        self.documents
            .lock()
            .map_err(|_| ContentError::Unavailable("document lock poisoned".to_string()))
    }

    fn update_order(
        &self,
        id: &OrderId,
        update: impl FnOnce(&mut Order) -> Result<(), ambre_core::OrderTransitionError>,
    ) -> Result<(), ContentError> {
        let mut documents = self.lock()?;
        let order = documents
            .orders
            .get_mut(id)
            .ok_or_else(|| ContentError::NotFound(format!("Order not found: {id}")))?;
        update(order)?;
        Ok(())
    }

    fn collect_orders(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, ContentError> {
        let documents = self.lock()?;
        let mut orders: Vec<Order> = documents.orders.values().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

impl ContentStore for MemoryContentStore {
    async fn fetch_products(&self) -> Result<Vec<Product>, ContentError> {
        Ok(self.lock()?.products.clone())
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, ContentError> {
        Ok(self.lock()?.products.iter().find(|p| &p.id == id).cloned())
    }

    async fn create_order(&self, order: &Order) -> Result<(), ContentError> {
        self.put_order(order.clone())
    }

    async fn mark_order_paid(
        &self,
        id: &OrderId,
        receipt: &PaymentReceipt,
        paid_at: DateTime<Utc>,
    ) -> Result<(), ContentError> {
        self.update_order(id, |order| order.mark_paid(receipt.clone(), paid_at))
    }

    async fn mark_order_failed(&self, id: &OrderId) -> Result<(), ContentError> {
        self.update_order(id, Order::mark_failed)
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, ContentError> {
        Ok(self.lock()?.orders.get(id).cloned())
    }

    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, ContentError> {
        self.collect_orders(|order| &order.user_id == user)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, ContentError> {
        self.collect_orders(|_| true)
    }

    async fn pending_orders_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, ContentError> {
        self.collect_orders(|order| {
            order.payment_status == PaymentStatus::Pending && order.created_at < cutoff
        })
    }
}
