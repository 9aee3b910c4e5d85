//! Unifies API for accessing the account directory.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Account, AccountId, AccountUpdate, NewAccount},
    gt_api::account_objects::AccountQueryFilter,
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` provides a unified API for registering and administering accounts.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers the account, or refreshes the profile of an existing one. Registration can never change the role
    /// or status of an account that already exists.
    pub async fn register(&self, mut account: NewAccount) -> Result<Account, AccountApiError> {
        account.email = account.email.trim().to_string();
        if account.email.is_empty() || !account.email.contains('@') {
            return Err(AccountApiError::InvalidInput(format!("'{}' is not a valid email address", account.email)));
        }
        let stored = self.db.upsert_account(account).await?;
        debug!("👤️ Account {} registered for {} ({}, {})", stored.id, stored.email, stored.role, stored.status);
        Ok(stored)
    }

    pub async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AccountApiError> {
        self.db.fetch_account_by_email(email).await
    }

    pub async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountApiError> {
        self.db.fetch_account(id).await
    }

    pub async fn search_accounts(&self, query: AccountQueryFilter) -> Result<Vec<Account>, AccountApiError> {
        self.db.search_accounts(query).await
    }

    /// Changes the role, status or name of an account.
    pub async fn update_account(&self, id: AccountId, update: AccountUpdate) -> Result<Account, AccountApiError> {
        if update.is_empty() {
            return Err(AccountApiError::InvalidInput("The account update contains no changes".into()));
        }
        let account =
            self.db.update_account(id, update).await?.ok_or_else(|| AccountApiError::AccountNotFound(id.to_string()))?;
        info!("👤️ Account {} updated. Role: {}, status: {}", account.email, account.role, account.status);
        Ok(account)
    }
}
