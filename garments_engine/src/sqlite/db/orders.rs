use std::collections::HashMap;

use gt_common::Cents;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use super::{products::StockReservation, push_pagination};
use crate::{
    db_types::{NewOrder, NewTrackingEvent, Order, OrderId, OrderStatusType, ProductId, TrackingEvent},
    gt_api::order_objects::OrderQueryFilter,
};

const ORDER_COLUMNS: &str = "id, product_id, product_name, quantity, unit_price, total_price, user_email, status, \
                             delivery_address, contact_number, notes, created_at, updated_at";
const TRACKING_COLUMNS: &str = "id, order_id, status, location, note, created_at";

/// Inserts a new `pending` order using the given connection. This is not atomic. Embed this call inside the
/// transaction that reserved the stock, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    order: &NewOrder,
    reservation: &StockReservation,
    total_price: Cents,
    conn: &mut SqliteConnection,
) -> Result<OrderId, sqlx::Error> {
    let (id,): (OrderId,) = sqlx::query_as(
        r#"
            INSERT INTO orders (
                product_id,
                product_name,
                quantity,
                unit_price,
                total_price,
                user_email,
                status,
                delivery_address,
                contact_number,
                notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
        "#,
    )
    .bind(order.product_id)
    .bind(&reservation.product_name)
    .bind(order.quantity)
    .bind(reservation.unit_price)
    .bind(total_price)
    .bind(&order.user_email)
    .bind(OrderStatusType::Pending)
    .bind(&order.delivery_address)
    .bind(&order.contact_number)
    .bind(&order.notes)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {id} inserted for {} x {}", order.quantity, order.product_id);
    Ok(id)
}

/// Fetches the order and its tracking history.
pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(mut order) => {
            order.tracking = tracking_for_order(id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_order_status(
    id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderStatusType>, sqlx::Error> {
    let status: Option<(OrderStatusType,)> =
        sqlx::query_as("SELECT status FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(status.map(|(s,)| s))
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`, each with its tracking history.
///
/// Resulting orders are ordered by `created_at` in descending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.user_email {
        where_clause.push("user_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(product_id) = query.product_id {
        where_clause.push("product_id = ");
        where_clause.push_bind_unseparated(product_id);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    push_pagination(&mut builder, query.limit, query.offset);

    trace!("📝️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    trace!("📝️ Result of search_orders: {}", orders.len());
    attach_tracking(&mut orders, conn).await?;
    Ok(orders)
}

async fn attach_tracking(orders: &mut [Order], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }
    let mut builder = QueryBuilder::new(format!("SELECT {TRACKING_COLUMNS} FROM tracking_events WHERE order_id IN ("));
    let mut ids = builder.separated(", ");
    for order in orders.iter() {
        ids.push_bind(order.id);
    }
    builder.push(") ORDER BY id ASC");
    let events = builder.build_query_as::<TrackingEvent>().fetch_all(conn).await?;
    let mut by_order = HashMap::<OrderId, Vec<TrackingEvent>>::new();
    for event in events {
        by_order.entry(event.order_id).or_default().push(event);
    }
    for order in orders.iter_mut() {
        order.tracking = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

pub async fn tracking_for_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<TrackingEvent>, sqlx::Error> {
    let events =
        sqlx::query_as(&format!("SELECT {TRACKING_COLUMNS} FROM tracking_events WHERE order_id = $1 ORDER BY id ASC"))
            .bind(id)
            .fetch_all(conn)
            .await?;
    Ok(events)
}

/// Moves the order into `cancelled`, unless it is already there. This must be the first statement of the
/// cancellation transaction. Returns the product and quantity to restore, or `None` if no row changed, meaning the
/// order is either missing or was already cancelled.
pub async fn mark_cancelled(
    id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<(ProductId, i64)>, sqlx::Error> {
    let row = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status <> 'cancelled'
            RETURNING product_id, quantity
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Writes any status except `cancelled` to an order that has not been cancelled. Returns `false` if no row changed.
pub async fn set_status_unless_cancelled(
    id: OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status <> 'cancelled'",
    )
    .bind(status)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Appends a tracking event if the order exists. Returns `false` if it does not.
pub async fn insert_tracking_event(
    id: OrderId,
    event: NewTrackingEvent,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO tracking_events (order_id, status, location, note)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM orders WHERE id = $1)
        "#,
    )
    .bind(id)
    .bind(event.status)
    .bind(event.location)
    .bind(event.note)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
