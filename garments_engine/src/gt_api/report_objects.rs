use gt_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PLACEHOLDER_LABEL: &str = "none";

/// One bar of a histogram.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub value: i64,
}

impl Bucket {
    pub fn new<S: Into<String>>(label: S, value: i64) -> Self {
        Self { label: label.into(), value }
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_LABEL, 0)
    }
}

/// Replaces an empty histogram with the single placeholder bucket so that charts always have something to draw.
pub fn or_placeholder(buckets: Vec<Bucket>) -> Vec<Bucket> {
    if buckets.is_empty() {
        vec![Bucket::placeholder()]
    } else {
        buckets
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub accounts: i64,
    pub products: i64,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub counts: RecordCounts,
    pub accounts_per_month: Vec<Bucket>,
    pub products_per_category: Vec<Bucket>,
    /// Revenue from approved orders, per month, in cents
    pub revenue_per_month: Vec<Bucket>,
    pub total_revenue: Cents,
    /// Set when at least one section could not be computed and was replaced by placeholder values.
    pub degraded: bool,
}
