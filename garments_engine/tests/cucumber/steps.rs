use cucumber::{then, when};
use garments_engine::db_types::{NewOrder, NewTrackingEvent, OrderStatusType, ProductId};
use gt_common::Cents;

use crate::cucumber::InventoryWorld;

#[when(expr = "{string} orders {int} units of {string}")]
async fn place_order(world: &mut InventoryWorld, email: String, quantity: i64, product: String) {
    let product_id = world.product_id(&product);
    order_product(world, email, quantity, product_id).await;
}

#[when(expr = "{string} orders {int} units of product #{int}")]
async fn place_order_by_id(world: &mut InventoryWorld, email: String, quantity: i64, product_id: i64) {
    order_product(world, email, quantity, ProductId(product_id)).await;
}

async fn order_product(world: &mut InventoryWorld, email: String, quantity: i64, product_id: ProductId) {
    let order = NewOrder::new(product_id, quantity, email).with_delivery_address("12 Loom Street");
    let result = world.system().orders.place_order(order).await;
    world.record(result);
}

#[when("the last order is cancelled")]
async fn cancel_last_order(world: &mut InventoryWorld) {
    let id = world.last_order_id();
    let result = world.system().orders.update_order_status(id, OrderStatusType::Cancelled).await;
    world.record(result);
}

#[when(expr = "the last order is moved to {string}")]
async fn move_last_order(world: &mut InventoryWorld, status: String) {
    let id = world.last_order_id();
    let status = status.parse::<OrderStatusType>().expect("Invalid order status");
    let result = world.system().orders.update_order_status(id, status).await;
    world.record(result);
}

#[when(expr = "{string} is restocked with {int} units")]
async fn restock(world: &mut InventoryWorld, product: String, amount: i64) {
    let id = world.product_id(&product);
    world.system().orders.restock_product(id, amount).await.expect("Error restocking product");
}

#[when(expr = "tracking event {string} is added to the last order")]
async fn add_tracking_event(world: &mut InventoryWorld, label: String) {
    let id = world.last_order_id();
    let event = NewTrackingEvent::new(label).with_location("Warehouse 4");
    let result = world.system().orders.append_tracking_event(id, event).await;
    world.record(result);
}

#[then("the order succeeds")]
async fn order_succeeds(world: &mut InventoryWorld) {
    match &world.last_result {
        Some(Ok(order)) => assert_eq!(order.status, OrderStatusType::Pending),
        Some(Err(e)) => panic!("Expected the order to succeed, but it failed: {e}"),
        None => panic!("No order has been placed"),
    }
}

#[then(expr = "the order fails with {string}")]
async fn order_fails(world: &mut InventoryWorld, kind: String) {
    match &world.last_result {
        Some(Err(e)) => assert_eq!(e.kind().as_str(), kind, "Unexpected error: {e}"),
        Some(Ok(order)) => panic!("Expected a failure, but got order {}", order.id),
        None => panic!("No operation has been performed"),
    }
}

#[then(expr = "the order total is {word}")]
async fn order_total(world: &mut InventoryWorld, total: String) {
    let expected = total.parse::<Cents>().expect("Invalid price");
    let order = world.last_result.as_ref().and_then(|r| r.as_ref().ok()).expect("No successful order");
    assert_eq!(order.total_price, expected);
    assert_eq!(order.unit_price * order.quantity, expected);
}

#[then(expr = "{string} has {int} units in stock")]
async fn check_stock(world: &mut InventoryWorld, product: String, quantity: i64) {
    let id = world.product_id(&product);
    let product = world.system().catalog.product_by_id(id).await.expect("Error fetching product").expect("No product");
    assert_eq!(product.quantity, quantity, "Stock level for {} is incorrect", product.name);
}

#[then(expr = "the last order has status {string}")]
async fn check_last_order_status(world: &mut InventoryWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Invalid order status");
    let id = world.last_order_id();
    let order = world.system().orders.order_by_id(id).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.status, expected);
}

#[then(expr = "the last order has the tracking events {string}")]
async fn check_tracking(world: &mut InventoryWorld, labels: String) {
    let id = world.last_order_id();
    let order = world.system().orders.order_by_id(id).await.expect("Error fetching order").expect("No order");
    let recorded = order.tracking.iter().map(|e| e.status.as_str()).collect::<Vec<_>>().join(", ");
    assert_eq!(recorded, labels);
}
