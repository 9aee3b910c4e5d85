use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType, ProductId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub user_email: Option<String>,
    pub product_id: Option<ProductId>,
    pub status: Option<OrderStatusType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_user_email<S: Into<String>>(mut self, email: S) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn with_product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// True if no filtering criteria are set. Pagination does not count as a filter.
    pub fn is_empty(&self) -> bool {
        self.user_email.is_none() && self.product_id.is_none() && self.status.is_none()
    }
}

/// The result of a cancellation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub order: Order,
    /// `false` when the order was already cancelled, in which case nothing was changed.
    pub stock_restored: bool,
}
