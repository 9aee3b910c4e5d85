use cucumber::given;
use garments_engine::db_types::NewProduct;
use gt_common::Cents;

use crate::cucumber::{inventory_world::GarmentsSystem, InventoryWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut InventoryWorld) {
    let system = GarmentsSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a product {string} with {int} units in stock priced at {word}")]
async fn product_in_stock(world: &mut InventoryWorld, name: String, quantity: i64, price: String) {
    create_product(world, name, quantity, price, 1).await;
}

#[given(expr = "a product {string} with {int} units in stock priced at {word} and a minimum order of {int}")]
async fn product_with_minimum_order(world: &mut InventoryWorld, name: String, quantity: i64, price: String, min: i64) {
    create_product(world, name, quantity, price, min).await;
}

async fn create_product(world: &mut InventoryWorld, name: String, quantity: i64, price: String, minimum_order: i64) {
    let price = price.parse::<Cents>().expect("Invalid price");
    let product = NewProduct::new(&name, price, quantity).with_category("apparel").with_minimum_order(minimum_order);
    let product =
        world.system().catalog.create_product(product, "manager@example.com").await.expect("Error creating product");
    world.products.insert(name, product.id);
}
