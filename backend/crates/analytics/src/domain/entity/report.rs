//! Report Shapes
//!
//! These are what gets cached, so every report round-trips through JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::entity::metrics::{
    BatchSummary, CompletedPayment, CourseSummary, EngagementMetrics, EnrollmentBreakdown,
    FinancialSummary, OverviewCounts, PaymentType, ProgressSummary,
};
use crate::domain::value_object::time_range::{TimeRange, TimeWindow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAnalytics {
    pub time_range: TimeRange,
    pub window: TimeWindow,
    pub overview: OverviewCounts,
    pub financial: FinancialSummary,
    pub engagement: EngagementMetrics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalytics {
    pub time_range: TimeRange,
    pub window: TimeWindow,
    pub batch: BatchSummary,
    pub enrollments: EnrollmentBreakdown,
    pub engagement: EngagementMetrics,
    pub progress: ProgressSummary,
    pub revenue: FinancialSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnalytics {
    pub time_range: TimeRange,
    pub window: TimeWindow,
    pub course: CourseSummary,
    pub batch_count: i64,
    pub enrollments: EnrollmentBreakdown,
    pub engagement: EngagementMetrics,
    pub revenue: FinancialSummary,
    pub average_progress: f64,
    pub generated_at: DateTime<Utc>,
}

/// One group of collected payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionBucket {
    pub label: String,
    pub amount: i64,
    pub count: i64,
    /// Share of the report's total amount
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCollectionReport {
    pub time_range: TimeRange,
    pub window: TimeWindow,
    pub total_amount: i64,
    pub total_count: i64,
    /// Always `full` then `emi`, zero buckets included
    pub by_type: Vec<CollectionBucket>,
    /// `YYYY-MM`, oldest first
    pub by_month: Vec<CollectionBucket>,
    pub generated_at: DateTime<Utc>,
}

impl PaymentCollectionReport {
    pub fn build(
        time_range: TimeRange,
        window: TimeWindow,
        payments: &[CompletedPayment],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let total_amount: i64 = payments.iter().map(|p| p.amount).sum();

        let mut by_type = Vec::with_capacity(2);
        for payment_type in [PaymentType::Full, PaymentType::Emi] {
            let (amount, count) = payments
                .iter()
                .filter(|p| p.payment_type == payment_type)
                .fold((0, 0), |(a, c), p| (a + p.amount, c + 1));
            by_type.push(bucket(payment_type.to_string(), amount, count, total_amount));
        }

        let mut months: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for p in payments {
            let entry = months.entry(p.paid_at.format("%Y-%m").to_string()).or_default();
            entry.0 += p.amount;
            entry.1 += 1;
        }
        let by_month = months
            .into_iter()
            .map(|(label, (amount, count))| bucket(label, amount, count, total_amount))
            .collect();

        Self {
            time_range,
            window,
            total_amount,
            total_count: payments.len() as i64,
            by_type,
            by_month,
            generated_at,
        }
    }
}

fn bucket(label: String, amount: i64, count: i64, total: i64) -> CollectionBucket {
    CollectionBucket {
        label,
        amount,
        count,
        percentage: if total == 0 {
            0.0
        } else {
            amount as f64 / total as f64 * 100.0
        },
    }
}
