use gt_common::Cents;
use log::{debug, trace, warn};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use super::push_pagination;
use crate::{
    db_types::{NewProduct, Product, ProductId, ProductUpdate},
    gt_api::product_objects::ProductQueryFilter,
    traits::{CatalogApiError, InventoryError},
};

const PRODUCT_COLUMNS: &str = "id, name, description, category, price, quantity, minimum_order, images, \
                               payment_options, show_on_home, rating, location, created_by, created_at, updated_at";

/// The parts of a product that are snapshotted onto an order when stock is reserved for it.
#[derive(Debug, Clone)]
pub struct StockReservation {
    pub product_name: String,
    pub unit_price: Cents,
    pub remaining: i64,
}

pub async fn insert_product(
    product: NewProduct,
    created_by: &str,
    conn: &mut SqliteConnection,
) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(&format!(
        r#"
            INSERT INTO products (
                name,
                description,
                category,
                price,
                quantity,
                minimum_order,
                images,
                payment_options,
                show_on_home,
                rating,
                location,
                created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(product.name)
    .bind(product.description)
    .bind(product.category)
    .bind(product.price)
    .bind(product.quantity)
    .bind(product.minimum_order)
    .bind(Json(product.images))
    .bind(product.payment_options)
    .bind(product.show_on_home)
    .bind(product.rating)
    .bind(product.location)
    .bind(created_by)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Product {} inserted", product.id);
    Ok(product)
}

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Fetches products according to criteria specified in the `ProductQueryFilter`.
///
/// Results are ordered by `created_at` descending unless the filter specifies otherwise. Ties are broken by id.
pub async fn search_products(
    query: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = query.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category);
    }
    if let Some(search) = query.search {
        where_clause.push("lower(name) LIKE ");
        where_clause.push_bind_unseparated(format!("%{}%", search.to_lowercase()));
    }
    if let Some(show) = query.show_on_home {
        where_clause.push("show_on_home = ");
        where_clause.push_bind_unseparated(show);
    }
    let sort = query.sort.unwrap_or_default();
    let order = query.order.unwrap_or_default();
    builder.push(format!(" ORDER BY {} {}, id {}", sort.column(), order.keyword(), order.keyword()));
    push_pagination(&mut builder, query.limit, query.offset);

    trace!("📝️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    trace!("📝️ Result of search_products: {}", products.len());
    Ok(products)
}

pub async fn update_product(
    id: ProductId,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP");
    if let Some(name) = update.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(description) = update.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }
    if let Some(category) = update.category {
        builder.push(", category = ");
        builder.push_bind(category);
    }
    if let Some(price) = update.price {
        builder.push(", price = ");
        builder.push_bind(price);
    }
    if let Some(minimum_order) = update.minimum_order {
        builder.push(", minimum_order = ");
        builder.push_bind(minimum_order);
    }
    if let Some(images) = update.images {
        builder.push(", images = ");
        builder.push_bind(Json(images));
    }
    if let Some(payment_options) = update.payment_options {
        builder.push(", payment_options = ");
        builder.push_bind(payment_options);
    }
    if let Some(show) = update.show_on_home {
        builder.push(", show_on_home = ");
        builder.push_bind(show);
    }
    if let Some(rating) = update.rating {
        builder.push(", rating = ");
        builder.push_bind(rating);
    }
    if let Some(location) = update.location {
        builder.push(", location = ");
        builder.push_bind(location);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {PRODUCT_COLUMNS}"));
    trace!("📝️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}

/// Removes the product, unless an order that has not been cancelled still refers to it. The check and the delete
/// are a single statement.
pub async fn delete_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Product, CatalogApiError> {
    let deleted: Option<Product> = sqlx::query_as(&format!(
        r#"
            DELETE FROM products
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM orders WHERE product_id = $1 AND status <> 'cancelled')
            RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(product) = deleted {
        debug!("📝️ Product {id} deleted");
        return Ok(product);
    }
    if fetch_product(id, &mut *conn).await?.is_none() {
        return Err(CatalogApiError::ProductNotFound(id));
    }
    let open_orders = count_open_orders(id, conn).await?;
    Err(CatalogApiError::ProductHasOpenOrders { product_id: id, open_orders })
}

pub async fn count_open_orders(id: ProductId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM orders WHERE product_id = $1 AND status <> 'cancelled'")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Takes `quantity` units out of stock with a single conditional update, so that the check and the decrement cannot
/// be separated by another writer. Returns `None` if nothing changed, i.e. the product does not exist, has too
/// little stock, or requires a larger minimum order. Use [`diagnose_failed_reservation`] to find out which.
pub async fn reserve_stock(
    id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<StockReservation>, sqlx::Error> {
    let row: Option<(String, Cents, i64)> = sqlx::query_as(
        r#"
            UPDATE products
            SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND quantity >= $1 AND minimum_order <= $1
            RETURNING name, price, quantity
        "#,
    )
    .bind(quantity)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(product_name, unit_price, remaining)| StockReservation { product_name, unit_price, remaining }))
}

/// Explains why [`reserve_stock`] did not change anything. Call this in the same transaction.
///
/// A missing product takes precedence over every quantity problem.
pub async fn diagnose_failed_reservation(
    id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<InventoryError, sqlx::Error> {
    let row: Option<(i64, i64)> = sqlx::query_as("SELECT quantity, minimum_order FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    let err = match row {
        None => InventoryError::ProductNotFound(id),
        Some(_) if quantity <= 0 => {
            InventoryError::InvalidQuantity(format!("Order quantity must be positive. Got {quantity}"))
        },
        Some((_, minimum_order)) if quantity < minimum_order => InventoryError::InvalidQuantity(format!(
            "{id} must be ordered in quantities of at least {minimum_order}. Got {quantity}"
        )),
        Some((available, _)) => InventoryError::InsufficientStock { product_id: id, requested: quantity, available },
    };
    Ok(err)
}

/// Returns `quantity` units to stock. Fails with `ProductNotFound` if the product no longer exists, and with
/// `InvalidQuantity` if the stock level would no longer fit in an `i64`.
pub async fn release_stock(id: ProductId, quantity: i64, conn: &mut SqliteConnection) -> Result<(), InventoryError> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET quantity = quantity + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND quantity <= $3 - $1
        "#,
    )
    .bind(quantity)
    .bind(id)
    .bind(i64::MAX)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(());
    }
    if fetch_product(id, conn).await?.is_none() {
        warn!("📝️ Tried to return {quantity} unit(s) to {id}, but the product does not exist");
        return Err(InventoryError::ProductNotFound(id));
    }
    warn!("📝️ Returning {quantity} unit(s) to {id} would overflow its stock level");
    Err(InventoryError::InvalidQuantity(format!(
        "Returning {quantity} unit(s) would exceed the maximum stock level of {id}"
    )))
}

/// Adds `amount` units to stock and returns the updated product. The stock level is bounded by `i64::MAX`; an
/// amount that would push it past that is an `InvalidQuantity`.
pub async fn restock_product(
    id: ProductId,
    amount: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, InventoryError> {
    let product: Option<Product> = sqlx::query_as(&format!(
        r#"
            UPDATE products
            SET quantity = quantity + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND quantity <= $3 - $1
            RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(amount)
    .bind(id)
    .bind(i64::MAX)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(product) = product {
        return Ok(product);
    }
    match fetch_product(id, conn).await? {
        None => Err(InventoryError::ProductNotFound(id)),
        Some(p) => Err(InventoryError::InvalidQuantity(format!(
            "Adding {amount} unit(s) to {id} would exceed the maximum stock level. It currently holds {}",
            p.quantity
        ))),
    }
}
