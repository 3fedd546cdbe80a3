//! HTTP client for the hosted content store.
//!
//! Reads go through the GROQ query endpoint, writes through the mutation
//! endpoint. Product reads are cached with `moka` (5-minute TTL); order reads
//! always hit the store.

use std::sync::Arc;
use std::time::Duration;

use ambre_core::{
    Order, OrderId, OrderTransitionError, PaymentReceipt, PaymentStatus, Product, ProductId,
    UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::documents::{order_document, product_from_document, products_from_documents};
use super::{ContentError, ContentStore, queries};
use crate::config::ContentConfig;

/// Query endpoint response envelope.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Guarded status writes retried after a revision conflict.
const STATUS_WRITE_ATTEMPTS: u32 = 3;

/// An order document together with the revision it was read at.
#[derive(Debug, Deserialize)]
struct RevisedOrder {
    #[serde(rename = "_rev")]
    rev: String,
    #[serde(flatten)]
    order: Order,
}

/// Client for the content store HTTP API.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    query_endpoint: String,
    mutate_endpoint: String,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ContentClient {
    /// Create a new content store client.
    #[must_use]
    pub fn new(config: &ContentConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let base = config.api_base();

        Self {
            inner: Arc::new(ContentClientInner {
                client: reqwest::Client::new(),
                query_endpoint: format!("{base}/data/query/{}", config.dataset),
                mutate_endpoint: format!("{base}/data/mutate/{}", config.dataset),
                token: config.token.clone(),
                cache,
            }),
        }
    }

    /// Drop all cached product reads.
    pub fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Run a GROQ query with JSON-encoded parameters.
    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, Value)],
    ) -> Result<T, ContentError> {
        let mut pairs = vec![("query".to_owned(), groq.to_owned())];
        for (name, value) in params {
            pairs.push((format!("${name}"), value.to_string()));
        }

        let mut request = self.inner.client.get(&self.inner.query_endpoint).query(&pairs);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let body = Self::read_body(request.send().await?).await?;
        let response: QueryResponse<T> = serde_json::from_str(&body).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse content query response"
            );
        })?;
        Ok(response.result)
    }

    /// Submit a batch of mutations. Requires a write token.
    async fn mutate(&self, mutations: Vec<Value>) -> Result<(), ContentError> {
        let token = self.inner.token.as_ref().ok_or(ContentError::MissingToken)?;

        let response = self
            .inner
            .client
            .post(&self.inner.mutate_endpoint)
            .bearer_auth(token.expose_secret())
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        Self::read_body(response).await?;
        Ok(())
    }

    /// Check the status and return the body text.
    async fn read_body(response: reqwest::Response) -> Result<String, ContentError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ContentError::RateLimited(retry_after));
        }

        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Content API returned non-success status"
            );
            return Err(ContentError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        Ok(text)
    }

    async fn require_order(&self, id: &OrderId) -> Result<RevisedOrder, ContentError> {
        let document: Option<RevisedOrder> = self
            .query(queries::ORDER_BY_ID, &[("orderId", json!(id))])
            .await?;
        document.ok_or_else(|| ContentError::NotFound(format!("Order not found: {id}")))
    }

    /// Read the order, apply `transition` and write the new status only if
    /// the document is still at the revision that was read.
    ///
    /// A conflicting write (409) re-reads the order, so an order settled in
    /// the meantime surfaces as [`ContentError::Transition`].
    async fn update_status<F>(&self, id: &OrderId, transition: F) -> Result<(), ContentError>
    where
        F: Fn(&mut Order) -> Result<(), OrderTransitionError>,
    {
        let mut attempt = 1;
        loop {
            let RevisedOrder { rev, mut order } = self.require_order(id).await?;
            transition(&mut order)?;

            match self.patch_status(&order, &rev).await {
                Err(ContentError::Api { status: 409, .. }) if attempt < STATUS_WRITE_ATTEMPTS => {
                    warn!(order_id = %id, rev = %rev, attempt, "Order changed during status write, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn patch_status(&self, order: &Order, rev: &str) -> Result<(), ContentError> {
        let mut set = json!({ "paymentStatus": order.payment_status });
        if order.payment_status == PaymentStatus::Paid {
            set["paidAt"] = json!(order.paid_at);
            set["receipt"] = json!(order.receipt);
        }

        self.mutate(vec![json!({
            "patch": {
                "id": order.order_id,
                "ifRevisionID": rev,
                "set": set,
            }
        })])
        .await
    }
}

impl ContentStore for ContentClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ContentError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let documents: Option<Vec<Value>> = self.query(queries::ALL_PRODUCTS, &[]).await?;
        let products = products_from_documents(documents.unwrap_or_default());

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::new(products.clone())))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, ContentError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let document: Option<Value> = self
            .query(queries::PRODUCT_BY_ID, &[("id", json!(id))])
            .await?;
        let Some(product) = document.and_then(product_from_document) else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn create_order(&self, order: &Order) -> Result<(), ContentError> {
        let document = order_document(order)?;
        self.mutate(vec![json!({ "create": document })]).await
    }

    #[instrument(skip(self, receipt), fields(order_id = %id))]
    async fn mark_order_paid(
        &self,
        id: &OrderId,
        receipt: &PaymentReceipt,
        paid_at: DateTime<Utc>,
    ) -> Result<(), ContentError> {
        self.update_status(id, |order| order.mark_paid(receipt.clone(), paid_at))
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn mark_order_failed(&self, id: &OrderId) -> Result<(), ContentError> {
        self.update_status(id, Order::mark_failed).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, ContentError> {
        self.query(queries::ORDER_BY_ID, &[("orderId", json!(id))])
            .await
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, ContentError> {
        let orders: Option<Vec<Order>> = self
            .query(queries::ORDERS_FOR_USER, &[("userId", json!(user))])
            .await?;
        Ok(orders.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn all_orders(&self) -> Result<Vec<Order>, ContentError> {
        let orders: Option<Vec<Order>> = self.query(queries::ALL_ORDERS, &[]).await?;
        Ok(orders.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn pending_orders_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, ContentError> {
        let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Millis, true);
        let orders: Option<Vec<Order>> = self
            .query(queries::PENDING_ORDERS_BEFORE, &[("cutoff", json!(cutoff))])
            .await?;
        Ok(orders.unwrap_or_default())
    }
}
