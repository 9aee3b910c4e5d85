//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
use std::{str::FromStr, time::Duration};

use log::info;
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    QueryBuilder,
    Sqlite,
    SqlitePool,
};

pub mod accounts;
pub mod orders;
pub mod products;
pub mod reports;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await?;
    info!("🗃️ Database migrations are up to date");
    Ok(())
}

/// Appends `LIMIT` and `OFFSET` clauses. SQLite only accepts an offset after a limit, so a bare offset gets an
/// unbounded (-1) limit.
pub(crate) fn push_pagination(builder: &mut QueryBuilder<'_, Sqlite>, limit: Option<i64>, offset: Option<i64>) {
    if limit.is_none() && offset.is_none() {
        return;
    }
    builder.push(" LIMIT ");
    builder.push_bind(limit.unwrap_or(-1));
    if let Some(offset) = offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
}
