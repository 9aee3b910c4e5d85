use thiserror::Error;

use crate::{
    db_types::{NewProduct, Product, ProductId, ProductUpdate},
    errors::{ErrorKind, StoreFault},
    gt_api::product_objects::ProductQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The catalog is busy. {0}")]
    Conflict(String),
    #[error("The catalog is unavailable. {0}")]
    Unavailable(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Product {product_id} cannot be deleted while it has {open_orders} open order(s)")]
    ProductHasOpenOrders { product_id: ProductId, open_orders: i64 },
    #[error("Invalid product data: {0}")]
    InvalidInput(String),
}

impl CatalogApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogApiError::DatabaseError(_) => ErrorKind::Internal,
            CatalogApiError::Conflict(_) | CatalogApiError::ProductHasOpenOrders { .. } => ErrorKind::Conflict,
            CatalogApiError::Unavailable(_) => ErrorKind::Unavailable,
            CatalogApiError::ProductNotFound(_) => ErrorKind::NotFound,
            CatalogApiError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        match StoreFault::classify(&e) {
            StoreFault::Busy => CatalogApiError::Conflict(e.to_string()),
            StoreFault::Unavailable => CatalogApiError::Unavailable(e.to_string()),
            StoreFault::Other => CatalogApiError::DatabaseError(e.to_string()),
        }
    }
}

/// Catalog maintenance. Stock levels are not part of this contract; see
/// [`InventoryManagement`](crate::traits::InventoryManagement).
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Publishes a new product on behalf of the account with email `created_by`.
    async fn insert_product(&self, product: NewProduct, created_by: &str) -> Result<Product, CatalogApiError>;

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, CatalogApiError>;

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;

    /// Applies a catalog edit and returns the modified product, or `None` if the product does not exist.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError>;

    /// Removes the product and returns its final state. Products referenced by any order that has not been cancelled
    /// cannot be deleted.
    async fn delete_product(&self, id: ProductId) -> Result<Product, CatalogApiError>;
}
