use std::{fmt::Debug, future::Future, time::Duration};

use log::*;

use crate::{
    db_types::{NewOrder, NewTrackingEvent, Order, OrderId, OrderStatusType, Product, ProductId},
    gt_api::order_objects::{CancelOutcome, OrderQueryFilter},
    traits::{InventoryError, InventoryManagement},
};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// `OrderFlowApi` is the order-and-inventory consistency engine. It is the only way that orders are created, change
/// status, or that product stock levels move.
///
/// All the atomicity guarantees come from the backend (see [`InventoryManagement`]). This API adds input validation,
/// and retries operations that fail because of lock contention in the store, up to `max_retries` times with a
/// linear back-off. When the retries are exhausted, `InventoryError::Conflict` is returned.
pub struct OrderFlowApi<B> {
    db: B,
    max_retries: u32,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi (max_retries: {})", self.max_retries)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, max_retries: DEFAULT_MAX_RETRIES }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: InventoryManagement
{
    /// Places an order for `order.quantity` units of a product. The stock is reserved in the same atomic step that
    /// records the order, so two buyers can never both be sold the last unit.
    ///
    /// The quantity is validated by the store after the product is resolved, so an order for a missing product is
    /// `ProductNotFound` whatever the quantity.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, InventoryError> {
        let placed = self.with_retries("place_order", || self.db.place_order(order.clone())).await?;
        info!(
            "🔄️📦️ Order {} placed by {} for {} x {} ({})",
            placed.id, placed.user_email, placed.quantity, placed.product_name, placed.total_price
        );
        Ok(placed)
    }

    /// Changes the status of an order.
    ///
    /// | From \ To         | pending / approved / shipped / delivered | cancelled                     |
    /// |-------------------|------------------------------------------|-------------------------------|
    /// | not cancelled     | status written                           | status written, stock restored |
    /// | cancelled         | `InvalidTransition`                      | no-op, order returned as is   |
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<Order, InventoryError> {
        match status {
            OrderStatusType::Cancelled => self.cancel_order(id).await.map(|outcome| outcome.order),
            status => {
                let order = self.with_retries("update_order_status", || self.db.set_order_status(id, status)).await?;
                debug!("🔄️📦️ Order {id} is now {status}");
                Ok(order)
            },
        }
    }

    /// Cancels the order and returns its units to the product. Only the first cancellation restores stock.
    pub async fn cancel_order(&self, id: OrderId) -> Result<CancelOutcome, InventoryError> {
        let outcome = self.with_retries("cancel_order", || self.db.cancel_order(id)).await?;
        if outcome.stock_restored {
            info!(
                "🔄️❌️ Order {id} cancelled. {} unit(s) returned to {}",
                outcome.order.quantity, outcome.order.product_id
            );
        } else {
            debug!("🔄️❌️ Order {id} was already cancelled. Nothing to do.");
        }
        Ok(outcome)
    }

    /// Records a tracking event against the order. Stock levels are unaffected.
    pub async fn append_tracking_event(&self, id: OrderId, event: NewTrackingEvent) -> Result<Order, InventoryError> {
        let order = self.db.append_tracking_event(id, event).await?;
        debug!("🔄️🚚️ Tracking event added to order {id}. {} event(s) recorded", order.tracking.len());
        Ok(order)
    }

    /// Raises the stock level of a product by `amount`.
    pub async fn restock_product(&self, id: ProductId, amount: i64) -> Result<Product, InventoryError> {
        if amount <= 0 {
            return Err(InventoryError::InvalidQuantity(format!("Restock amount must be positive. Got {amount}")));
        }
        let product = self.with_retries("restock_product", || self.db.restock_product(id, amount)).await?;
        info!("🔄️📦️ {id} restocked with {amount} unit(s). {} now available", product.quantity);
        Ok(product)
    }

    pub async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, InventoryError> {
        self.db.fetch_order(id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError> {
        self.db.search_orders(query).await
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, InventoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InventoryError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("🔄️🔒️ {operation} hit lock contention (retry {attempt} of {}). {e}", self.max_retries);
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                },
                Err(InventoryError::Conflict(msg)) => {
                    warn!("🔄️🔒️ {operation} gave up after {} attempt(s)", attempt + 1);
                    return Err(InventoryError::Conflict(format!(
                        "{operation} could not complete after {} attempt(s). {msg}",
                        attempt + 1
                    )));
                },
                result => return result,
            }
        }
    }
}
