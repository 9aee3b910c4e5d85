use thiserror::Error;

use crate::{
    db_types::OrderStatusType,
    errors::{ErrorKind, StoreFault},
    gt_api::report_objects::{Bucket, RecordCounts},
};

#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The store is unavailable. {0}")]
    Unavailable(String),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::DatabaseError(_) => ErrorKind::Internal,
            ReportError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<sqlx::Error> for ReportError {
    fn from(e: sqlx::Error) -> Self {
        match StoreFault::classify(&e) {
            StoreFault::Unavailable => ReportError::Unavailable(e.to_string()),
            StoreFault::Busy | StoreFault::Other => ReportError::DatabaseError(e.to_string()),
        }
    }
}

/// Read-only aggregate queries used by the analytics dashboard.
#[allow(async_fn_in_trait)]
pub trait ReportingStore {
    async fn count_records(&self) -> Result<RecordCounts, ReportError>;

    /// Number of accounts created per calendar month, labelled `YYYY-MM`, oldest first.
    async fn accounts_per_month(&self) -> Result<Vec<Bucket>, ReportError>;

    /// Number of products per category, largest category first.
    async fn products_per_category(&self) -> Result<Vec<Bucket>, ReportError>;

    /// Sum of `total_price` (in cents) of orders with the given status, per calendar month, oldest first.
    async fn revenue_per_month(&self, status: OrderStatusType) -> Result<Vec<Bucket>, ReportError>;
}
