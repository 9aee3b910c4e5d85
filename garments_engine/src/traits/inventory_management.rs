use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewTrackingEvent, Order, OrderId, OrderStatusType, Product, ProductId},
    errors::{ErrorKind, StoreFault},
    gt_api::order_objects::{CancelOutcome, OrderQueryFilter},
};

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The store is busy. {0}")]
    Conflict(String),
    #[error("The store is unavailable. {0}")]
    Unavailable(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Insufficient stock for {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::DatabaseError(_) => ErrorKind::Internal,
            InventoryError::Conflict(_) => ErrorKind::Conflict,
            InventoryError::Unavailable(_) => ErrorKind::Unavailable,
            InventoryError::ProductNotFound(_) | InventoryError::OrderNotFound(_) => ErrorKind::NotFound,
            InventoryError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            InventoryError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            InventoryError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        }
    }

    /// Lock contention is the only failure worth trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InventoryError::Conflict(_))
    }
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        match StoreFault::classify(&e) {
            StoreFault::Busy => InventoryError::Conflict(e.to_string()),
            StoreFault::Unavailable => InventoryError::Unavailable(e.to_string()),
            StoreFault::Other => InventoryError::DatabaseError(e.to_string()),
        }
    }
}

/// The `InventoryManagement` trait is the storage contract behind the order-and-inventory engine.
///
/// Backends must guarantee that, for every product,
/// `quantity = initial quantity + restocks - sum of quantities of orders that are not cancelled`
/// holds after every call, no matter how many calls run concurrently. In practice this means that
/// [`place_order`](Self::place_order) and [`cancel_order`](Self::cancel_order) each run in a single atomic
/// transaction, and that the stock checks are expressed as conditional writes rather than read-then-write.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// Reserves `order.quantity` units of the product and records a `pending` order, atomically.
    ///
    /// Fails with `ProductNotFound`, `InvalidQuantity` (non-positive, below the product's minimum order, or a total
    /// price that overflows) or `InsufficientStock`. A missing product is reported before any quantity problem. No
    /// stock is reserved when the call fails.
    async fn place_order(&self, order: NewOrder) -> Result<Order, InventoryError>;

    /// Cancels the order and returns its units to the product, atomically.
    ///
    /// Only the call that actually moves the order into `cancelled` restores stock; cancelling an order that is
    /// already cancelled returns it unchanged with `stock_restored = false`. If the product has disappeared, the
    /// whole operation is rolled back and `ProductNotFound` is returned.
    async fn cancel_order(&self, id: OrderId) -> Result<CancelOutcome, InventoryError>;

    /// Moves the order to any status other than `cancelled`. Orders that are already cancelled are final and result
    /// in `InvalidTransition`. Use [`cancel_order`](Self::cancel_order) to cancel.
    async fn set_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<Order, InventoryError>;

    /// Appends a tracking event to the order and returns the order with its full tracking history.
    async fn append_tracking_event(&self, id: OrderId, event: NewTrackingEvent) -> Result<Order, InventoryError>;

    /// Adds `amount` units to the product's stock. An amount that would overflow the stock level is `InvalidQuantity`.
    async fn restock_product(&self, id: ProductId, amount: i64) -> Result<Product, InventoryError>;

    /// Fetches the order, including its tracking history.
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, InventoryError>;

    /// Fetches the orders matching the filter, newest first, each including its tracking history.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError>;
}
