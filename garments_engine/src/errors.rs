//! Stable error kinds shared by every engine API, and the classification of raw storage failures.
//!
//! Each API has its own `thiserror` enum, but callers (the HTTP layer in particular) only need to know which
//! *kind* of failure occurred. [`ErrorKind`] is that stable vocabulary.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InvalidQuantity,
    InsufficientStock,
    InvalidTransition,
    Unauthorized,
    Forbidden,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidQuantity => "invalid_quantity",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw `sqlx::Error` should be treated by the layers above the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    /// Lock contention (`SQLITE_BUSY`, `SQLITE_LOCKED` and their extended codes). Safe to retry.
    Busy,
    /// The store could not be reached at all: pool timeouts, closed pools and I/O failures.
    Unavailable,
    Other,
}

// Primary and extended SQLite result codes for BUSY (5, 517 = BUSY_SNAPSHOT, 261 = BUSY_RECOVERY) and
// LOCKED (6, 262 = LOCKED_SHAREDCACHE).
const BUSY_CODES: [&str; 5] = ["5", "6", "261", "262", "517"];

impl StoreFault {
    pub fn classify(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let busy_code = db_err.code().map(|c| BUSY_CODES.iter().any(|b| *b == c)).unwrap_or(false);
                let message = db_err.message().to_ascii_lowercase();
                if busy_code || message.contains("database is locked") || message.contains("database table is locked")
                {
                    StoreFault::Busy
                } else {
                    StoreFault::Other
                }
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) => {
                StoreFault::Unavailable
            },
            _ => StoreFault::Other,
        }
    }
}
