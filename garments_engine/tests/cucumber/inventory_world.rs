use std::collections::HashMap;

use cucumber::World;
use garments_engine::{
    db_types::{Order, OrderId, ProductId},
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    CatalogApi,
    InventoryError,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct InventoryWorld {
    pub system: Option<GarmentsSystem>,
    /// Product ids, keyed by product name
    pub products: HashMap<String, ProductId>,
    pub last_order: Option<OrderId>,
    pub last_result: Option<Result<Order, InventoryError>>,
}

#[derive(Debug)]
pub struct GarmentsSystem {
    pub db_path: String,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
}

impl InventoryWorld {
    pub fn system(&self) -> &GarmentsSystem {
        self.system.as_ref().expect("Garments system not initialised")
    }

    pub fn product_id(&self, name: &str) -> ProductId {
        *self.products.get(name).unwrap_or_else(|| panic!("No product called {name} has been created"))
    }

    pub fn last_order_id(&self) -> OrderId {
        self.last_order.expect("No order has been placed yet")
    }

    pub fn record(&mut self, result: Result<Order, InventoryError>) {
        if let Ok(order) = &result {
            self.last_order = Some(order.id);
        }
        self.last_result = Some(result);
    }
}

impl GarmentsSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        create_database(&url).await;
        let db = run_migrations(&url).await;
        debug!("Created database: {url}");
        let orders = OrderFlowApi::new(db.clone());
        let catalog = CatalogApi::new(db);
        Self { db_path: url, orders, catalog }
    }
}
