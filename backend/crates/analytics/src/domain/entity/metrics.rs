//! Aggregate Metrics
//!
//! Raw counts come from an [`AnalyticsSource`](crate::domain::AnalyticsSource);
//! the derived rates and averages are computed here.

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use kernel::id::{BatchId, CourseId, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AnalyticsError;

pub const ATTENDANCE_WEIGHT: f64 = 0.3;
pub const MATERIAL_WEIGHT: f64 = 0.25;
pub const SUBMISSION_WEIGHT: f64 = 0.3;
pub const DOUBT_WEIGHT: f64 = 0.15;

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCounts {
    pub total_students: i64,
    pub total_instructors: i64,
    pub total_courses: i64,
    pub total_batches: i64,
    pub active_batches: i64,
    pub total_enrollments: i64,
    /// Enrollments created inside the report window
    pub new_enrollments: i64,
    pub active_enrollments: i64,
}

// ============================================================================
// Financial
// ============================================================================

/// Payment sums in minor currency units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinancialTotals {
    pub revenue: i64,
    pub payment_count: i64,
    pub full_revenue: i64,
    pub emi_revenue: i64,
    pub pending_amount: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub revenue: i64,
    pub payment_count: i64,
    pub full_revenue: i64,
    pub emi_revenue: i64,
    pub pending_amount: i64,
    pub average_payment: f64,
}

impl From<FinancialTotals> for FinancialSummary {
    fn from(t: FinancialTotals) -> Self {
        Self {
            revenue: t.revenue,
            payment_count: t.payment_count,
            full_revenue: t.full_revenue,
            emi_revenue: t.emi_revenue,
            pending_amount: t.pending_amount,
            average_payment: if t.payment_count == 0 {
                0.0
            } else {
                t.revenue as f64 / t.payment_count as f64
            },
        }
    }
}

// ============================================================================
// Engagement
// ============================================================================

/// Numerators and denominators of the engagement rates
///
/// Every `*_slots` denominator is the sum over batches of
/// (items in the batch x students actively enrolled in it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementCounts {
    pub attendance_marks: i64,
    pub session_slots: i64,
    pub material_completions: i64,
    pub material_slots: i64,
    pub submissions: i64,
    pub assignment_slots: i64,
    pub distinct_askers: i64,
    pub enrolled_students: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub session_attendance_rate: f64,
    pub material_completion_rate: f64,
    pub assignment_submission_rate: f64,
    pub doubt_participation_rate: f64,
    pub overall_score: f64,
}

impl From<EngagementCounts> for EngagementMetrics {
    fn from(c: EngagementCounts) -> Self {
        let attendance = rate(c.attendance_marks, c.session_slots);
        let material = rate(c.material_completions, c.material_slots);
        let submission = rate(c.submissions, c.assignment_slots);
        let doubt = rate(c.distinct_askers, c.enrolled_students);

        Self {
            session_attendance_rate: attendance,
            material_completion_rate: material,
            assignment_submission_rate: submission,
            doubt_participation_rate: doubt,
            overall_score: ATTENDANCE_WEIGHT * attendance
                + MATERIAL_WEIGHT * material
                + SUBMISSION_WEIGHT * submission
                + DOUBT_WEIGHT * doubt,
        }
    }
}

/// Percentage in `[0, 100]`; 0 when nothing could have happened
pub fn rate(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        0.0
    } else {
        (numerator as f64 / denominator as f64 * 100.0).clamp(0.0, 100.0)
    }
}

// ============================================================================
// Enrollment and progress
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBreakdown {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub dropped: i64,
    pub suspended: i64,
}

impl EnrollmentBreakdown {
    /// Add `count` enrollments of the stored `status`; unknown statuses only count towards the total
    pub fn add(&mut self, status: &str, count: i64) {
        match status {
            "active" => self.active += count,
            "completed" => self.completed += count,
            "dropped" => self.dropped += count,
            "suspended" => self.suspended += count,
            other => tracing::warn!(status = %other, "Unknown enrollment status in analytics"),
        }
        self.total += count;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub tracked_students: i64,
    pub average_progress: f64,
    pub at_risk_count: i64,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub course_id: CourseId,
    pub course_title: String,
    pub name: String,
    pub status: String,
    pub instructor_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: CourseId,
    pub title: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[display("full")]
    Full,
    #[display("emi")]
    Emi,
}

impl FromStr for PaymentType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(PaymentType::Full),
            "emi" => Ok(PaymentType::Emi),
            other => Err(AnalyticsError::Internal(format!(
                "Unknown payment type in storage: {other}"
            ))),
        }
    }
}

/// A completed payment inside the report window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedPayment {
    pub amount: i64,
    pub payment_type: PaymentType,
    pub paid_at: DateTime<Utc>,
}
