use std::fmt::Debug;

use gt_common::Cents;
use log::*;

use crate::{
    db_types::OrderStatusType,
    gt_api::report_objects::{or_placeholder, AnalyticsReport, RecordCounts},
    traits::{ReportError, ReportingStore},
};

/// `ReportingApi` builds the analytics dashboard. Unlike the rest of the engine, it never fails: any section that
/// cannot be computed is replaced by zeros or placeholder buckets, and the report is flagged as degraded.
pub struct ReportingApi<B> {
    db: B,
}

impl<B: Debug> Debug for ReportingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReportingApi ({:?})", self.db)
    }
}

fn or_fallback<T>(section: &str, result: Result<T, ReportError>, fallback: T, degraded: &mut bool) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("📊️ Could not compute the {section} section of the analytics report. {e}");
            *degraded = true;
            fallback
        },
    }
}

impl<B> ReportingApi<B>
where B: ReportingStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn analytics(&self) -> AnalyticsReport {
        let mut degraded = false;
        let counts = or_fallback("record count", self.db.count_records().await, RecordCounts::default(), &mut degraded);
        let accounts = or_fallback("accounts", self.db.accounts_per_month().await, vec![], &mut degraded);
        let categories = or_fallback("categories", self.db.products_per_category().await, vec![], &mut degraded);
        let revenue = or_fallback(
            "revenue",
            self.db.revenue_per_month(OrderStatusType::Approved).await,
            vec![],
            &mut degraded,
        );
        let total_revenue = revenue.iter().map(|b| Cents::from(b.value)).sum::<Cents>();
        trace!("📊️ Analytics report computed. Degraded: {degraded}");
        AnalyticsReport {
            counts,
            accounts_per_month: or_placeholder(accounts),
            products_per_category: or_placeholder(categories),
            revenue_per_month: or_placeholder(revenue),
            total_revenue,
            degraded,
        }
    }
}
