use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductId, ProductUpdate},
    gt_api::product_objects::ProductQueryFilter,
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` publishes, edits, lists and removes products.
pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, product: NewProduct, created_by: &str) -> Result<Product, CatalogApiError> {
        product.validate().map_err(CatalogApiError::InvalidInput)?;
        let product = self.db.insert_product(product, created_by).await?;
        info!("🛍️ {} ({}) published by {created_by} with {} unit(s)", product.id, product.name, product.quantity);
        Ok(product)
    }

    pub async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(id).await
    }

    pub async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        self.db.search_products(query).await
    }

    /// At most six products flagged for the home page, newest first.
    pub async fn home_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.search_products(ProductQueryFilter::home_page()).await
    }

    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        if update.is_empty() {
            return Err(CatalogApiError::InvalidInput("The product update contains no changes".into()));
        }
        update.validate().map_err(CatalogApiError::InvalidInput)?;
        let product = self.db.update_product(id, update).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        debug!("🛍️ {id} updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<Product, CatalogApiError> {
        let product = self.db.delete_product(id).await?;
        info!("🛍️ {id} ({}) removed from the catalog", product.name);
        Ok(product)
    }
}
