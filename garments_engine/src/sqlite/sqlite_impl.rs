//! `SqliteDatabase` is a concrete implementation of a Garments Tracker engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! The two operations that move stock, placing and cancelling orders, each run in one transaction whose first
//! statement is a conditional write. SQLite therefore takes the write lock before anything is read, and concurrent
//! writers queue behind the busy timeout instead of acting on stale reads.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{accounts, new_pool, orders, products, reports, run_migrations};
use crate::{
    db_types::{
        Account,
        AccountId,
        AccountUpdate,
        NewAccount,
        NewOrder,
        NewProduct,
        NewTrackingEvent,
        Order,
        OrderId,
        OrderStatusType,
        Product,
        ProductId,
        ProductUpdate,
    },
    gt_api::{
        account_objects::AccountQueryFilter,
        order_objects::{CancelOutcome, OrderQueryFilter},
        product_objects::ProductQueryFilter,
        report_objects::{Bucket, RecordCounts},
    },
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogApiError,
        CatalogManagement,
        InventoryError,
        InventoryManagement,
        ReportError,
        ReportingStore,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object. The database file is created if it does not exist yet, but the schema is
    /// not touched. Call [`Self::migrate`] for that.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connection pool for {url} created with {max_connections} connections");
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        run_migrations(&self.pool).await
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl AccountManagement for SqliteDatabase {
    async fn upsert_account(&self, account: NewAccount) -> Result<Account, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::upsert_account(account, &mut conn).await
    }

    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::account_by_email(email, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_account(&self, id: AccountId) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::account_by_id(id, &mut conn).await?;
        Ok(account)
    }

    async fn search_accounts(&self, query: AccountQueryFilter) -> Result<Vec<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let accounts = accounts::search_accounts(query, &mut conn).await?;
        Ok(accounts)
    }

    async fn update_account(&self, id: AccountId, update: AccountUpdate) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::update_account(id, update, &mut conn).await?;
        Ok(account)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct, created_by: &str) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, created_by, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::search_products(query, &mut conn).await?;
        Ok(products)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(id, update, &mut conn).await?;
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::delete_product(id, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }
}

impl InventoryManagement for SqliteDatabase {
    /// Reserves the stock and records the order in a single atomic transaction:
    /// * the product's quantity is decremented with a conditional update. If no row changes, the transaction is rolled
    ///   back and the reason is reported. A missing product is reported before any quantity problem, and a
    ///   non-positive quantity never touches the stock.
    /// * a total price that overflows is rejected, and dropping the transaction returns the stock.
    /// * the order is inserted with a snapshot of the product's name and price, in the `pending` state.
    async fn place_order(&self, order: NewOrder) -> Result<Order, InventoryError> {
        let mut tx = self.pool.begin().await?;
        let reserved = if order.quantity > 0 {
            products::reserve_stock(order.product_id, order.quantity, &mut tx).await?
        } else {
            None
        };
        let reservation = match reserved {
            Some(r) => r,
            None => {
                let err = products::diagnose_failed_reservation(order.product_id, order.quantity, &mut tx).await?;
                debug!("🗃️ Order for {} x {} rejected. {err}", order.quantity, order.product_id);
                return Err(err);
            },
        };
        let Some(total_price) = reservation.unit_price.checked_mul(order.quantity) else {
            debug!("🗃️ Order for {} x {} rejected. The total overflows", order.quantity, order.product_id);
            return Err(InventoryError::InvalidQuantity(format!(
                "The total price of {} x {} is too large to record",
                order.quantity, reservation.product_name
            )));
        };
        let id = orders::insert_order(&order, &reservation, total_price, &mut tx).await?;
        let placed = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        tx.commit().await?;
        debug!("🗃️ Order {id} saved. {} unit(s) of {} remain", reservation.remaining, order.product_id);
        Ok(placed)
    }

    /// Cancels the order and restores its stock in a single atomic transaction. The status change comes first, and
    /// is conditional on the order not being cancelled yet, so that only one of any number of concurrent
    /// cancellations gets to restore the stock.
    async fn cancel_order(&self, id: OrderId) -> Result<CancelOutcome, InventoryError> {
        let mut tx = self.pool.begin().await?;
        let stock_restored = match orders::mark_cancelled(id, &mut tx).await? {
            Some((product_id, quantity)) => {
                if let Err(e) = products::release_stock(product_id, quantity, &mut tx).await {
                    error!("🗃️ Stock for order {id} cannot be restored. The cancellation has been rolled back. {e}");
                    return Err(e);
                }
                true
            },
            None => false,
        };
        let order = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        tx.commit().await?;
        Ok(CancelOutcome { order, stock_restored })
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<Order, InventoryError> {
        if status == OrderStatusType::Cancelled {
            return Err(InventoryError::InvalidTransition { order_id: id, from: status, to: status });
        }
        let mut tx = self.pool.begin().await?;
        if !orders::set_status_unless_cancelled(id, status, &mut tx).await? {
            return match orders::fetch_order_status(id, &mut tx).await? {
                None => Err(InventoryError::OrderNotFound(id)),
                Some(from) => Err(InventoryError::InvalidTransition { order_id: id, from, to: status }),
            };
        }
        let order = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        tx.commit().await?;
        Ok(order)
    }

    async fn append_tracking_event(&self, id: OrderId, event: NewTrackingEvent) -> Result<Order, InventoryError> {
        let mut tx = self.pool.begin().await?;
        if !orders::insert_tracking_event(id, event, &mut tx).await? {
            return Err(InventoryError::OrderNotFound(id));
        }
        let order = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        tx.commit().await?;
        Ok(order)
    }

    async fn restock_product(&self, id: ProductId, amount: i64) -> Result<Product, InventoryError> {
        if amount <= 0 {
            return Err(InventoryError::InvalidQuantity(format!("Restock amount must be positive. Got {amount}")));
        }
        let mut conn = self.pool.acquire().await?;
        products::restock_product(id, amount, &mut conn).await
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl ReportingStore for SqliteDatabase {
    async fn count_records(&self) -> Result<RecordCounts, ReportError> {
        let mut conn = self.pool.acquire().await?;
        let counts = reports::count_records(&mut conn).await?;
        Ok(counts)
    }

    async fn accounts_per_month(&self) -> Result<Vec<Bucket>, ReportError> {
        let mut conn = self.pool.acquire().await?;
        let buckets = reports::accounts_per_month(&mut conn).await?;
        Ok(buckets)
    }

    async fn products_per_category(&self) -> Result<Vec<Bucket>, ReportError> {
        let mut conn = self.pool.acquire().await?;
        let buckets = reports::products_per_category(&mut conn).await?;
        Ok(buckets)
    }

    async fn revenue_per_month(&self, status: OrderStatusType) -> Result<Vec<Bucket>, ReportError> {
        let mut conn = self.pool.acquire().await?;
        let buckets = reports::revenue_per_month(status, &mut conn).await?;
        Ok(buckets)
    }
}
