use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use super::push_pagination;
use crate::{
    db_types::{Account, AccountId, AccountUpdate, NewAccount},
    gt_api::account_objects::AccountQueryFilter,
    traits::AccountApiError,
};

const ACCOUNT_COLUMNS: &str = "id, email, name, photo_url, role, status, created_at, updated_at";

/// Inserts a new account, or refreshes the name and photo of an existing one. Blank names and missing photos keep
/// the stored values. The role and status of existing accounts are never touched here.
pub async fn upsert_account(account: NewAccount, conn: &mut SqliteConnection) -> Result<Account, AccountApiError> {
    let status = account.initial_status();
    let stored: Account = sqlx::query_as(&format!(
        r#"
            INSERT INTO accounts (email, name, photo_url, role, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(NULLIF(excluded.name, ''), accounts.name),
                photo_url = COALESCE(excluded.photo_url, accounts.photo_url),
                updated_at = CURRENT_TIMESTAMP
            RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(&account.email)
    .bind(&account.name)
    .bind(&account.photo_url)
    .bind(account.role)
    .bind(status)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Account {} stored for {}", stored.id, stored.email);
    Ok(stored)
}

pub async fn account_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Account>, sqlx::Error> {
    let account = sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

pub async fn account_by_id(id: AccountId, conn: &mut SqliteConnection) -> Result<Option<Account>, sqlx::Error> {
    let account = sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Fetches accounts according to criteria specified in the `AccountQueryFilter`, ordered by id.
pub async fn search_accounts(
    query: AccountQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Account>, sqlx::Error> {
    let mut builder = QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM accounts"));
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(search) = query.search {
        let pattern = format!("%{}%", search.to_lowercase());
        where_clause.push("(lower(name) LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR lower(email) LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    if let Some(role) = query.role {
        where_clause.push("role = ");
        where_clause.push_bind_unseparated(role);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    builder.push(" ORDER BY id ASC");
    push_pagination(&mut builder, query.limit, query.offset);

    trace!("📝️ Executing query: {}", builder.sql());
    let accounts = builder.build_query_as::<Account>().fetch_all(conn).await?;
    trace!("📝️ Result of search_accounts: {}", accounts.len());
    Ok(accounts)
}

pub async fn update_account(
    id: AccountId,
    update: AccountUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE accounts SET updated_at = CURRENT_TIMESTAMP");
    if let Some(name) = update.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(role) = update.role {
        builder.push(", role = ");
        builder.push_bind(role);
    }
    if let Some(status) = update.status {
        builder.push(", status = ");
        builder.push_bind(status);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {ACCOUNT_COLUMNS}"));
    trace!("📝️ Executing query: {}", builder.sql());
    let account = builder.build_query_as::<Account>().fetch_optional(conn).await?;
    Ok(account)
}
