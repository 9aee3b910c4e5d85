use thiserror::Error;

use crate::{
    db_types::{Account, AccountId, AccountUpdate, NewAccount},
    errors::{ErrorKind, StoreFault},
    gt_api::account_objects::AccountQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The account directory is busy. {0}")]
    Conflict(String),
    #[error("The account directory is unavailable. {0}")]
    Unavailable(String),
    #[error("Account {0} does not exist")]
    AccountNotFound(String),
    #[error("Invalid account data: {0}")]
    InvalidInput(String),
}

impl AccountApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountApiError::DatabaseError(_) => ErrorKind::Internal,
            AccountApiError::Conflict(_) => ErrorKind::Conflict,
            AccountApiError::Unavailable(_) => ErrorKind::Unavailable,
            AccountApiError::AccountNotFound(_) => ErrorKind::NotFound,
            AccountApiError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        match StoreFault::classify(&e) {
            StoreFault::Busy => AccountApiError::Conflict(e.to_string()),
            StoreFault::Unavailable => AccountApiError::Unavailable(e.to_string()),
            StoreFault::Other => AccountApiError::DatabaseError(e.to_string()),
        }
    }
}

/// The `AccountManagement` trait defines behaviour for the account directory.
///
/// Accounts are keyed by email. They are created (or refreshed) on registration, are only ever modified by
/// administrators afterwards, and are never deleted.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Inserts the account if the email is new. If the email is already registered, the existing role and status are
    /// kept and only the display name and photo are refreshed. Either way, the stored account is returned.
    async fn upsert_account(&self, account: NewAccount) -> Result<Account, AccountApiError>;

    /// Fetches the account for the given email. If no account exists, `None` is returned.
    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountApiError>;

    async fn fetch_account(&self, id: AccountId) -> Result<Option<Account>, AccountApiError>;

    /// Fetches accounts matching the filter, ordered by id.
    async fn search_accounts(&self, query: AccountQueryFilter) -> Result<Vec<Account>, AccountApiError>;

    /// Applies the update and returns the modified account, or `None` if there is no account with the given id.
    async fn update_account(&self, id: AccountId, update: AccountUpdate) -> Result<Option<Account>, AccountApiError>;
}
