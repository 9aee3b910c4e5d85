use sqlx::SqliteConnection;

use crate::{
    db_types::OrderStatusType,
    gt_api::report_objects::{Bucket, RecordCounts},
};

pub async fn count_records(conn: &mut SqliteConnection) -> Result<RecordCounts, sqlx::Error> {
    let (accounts, products, orders): (i64, i64, i64) = sqlx::query_as(
        r#"
            SELECT
                (SELECT count(*) FROM accounts),
                (SELECT count(*) FROM products),
                (SELECT count(*) FROM orders)
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok(RecordCounts { accounts, products, orders })
}

pub async fn accounts_per_month(conn: &mut SqliteConnection) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT substr(created_at, 1, 7) AS label, count(*) AS value
            FROM accounts
            GROUP BY label
            ORDER BY label ASC
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn products_per_category(conn: &mut SqliteConnection) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT category AS label, count(*) AS value
            FROM products
            GROUP BY category
            ORDER BY value DESC, label ASC
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn revenue_per_month(
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Vec<Bucket>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT substr(created_at, 1, 7) AS label, CAST(total(total_price) AS INTEGER) AS value
            FROM orders
            WHERE status = $1
            GROUP BY label
            ORDER BY label ASC
        "#,
    )
    .bind(status)
    .fetch_all(conn)
    .await
}
