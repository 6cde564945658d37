//! Source Trait
//!
//! Read-only aggregate queries over the domain collections. Every method
//! returns raw counts or sums; derived rates are computed in the domain.

use kernel::id::{BatchId, CourseId, UserId};

use crate::domain::entity::metrics::{
    BatchSummary, CompletedPayment, CourseSummary, EngagementCounts, EnrollmentBreakdown,
    FinancialTotals, OverviewCounts, ProgressSummary,
};
use crate::domain::value_object::{scope::Scope, time_range::TimeWindow};
use crate::error::AnalyticsResult;

#[trait_variant::make(AnalyticsSource: Send)]
pub trait LocalAnalyticsSource {
    async fn overview_counts(&self, window: &TimeWindow) -> AnalyticsResult<OverviewCounts>;

    /// Completed payments inside the window, plus the pending amount of the scope
    async fn financial_totals(
        &self,
        scope: &Scope,
        window: &TimeWindow,
    ) -> AnalyticsResult<FinancialTotals>;

    /// Activity inside the window against the actively enrolled population
    async fn engagement_counts(
        &self,
        scope: &Scope,
        window: &TimeWindow,
    ) -> AnalyticsResult<EngagementCounts>;

    async fn enrollment_breakdown(&self, scope: &Scope) -> AnalyticsResult<EnrollmentBreakdown>;

    async fn progress_summary(&self, scope: &Scope) -> AnalyticsResult<ProgressSummary>;

    async fn find_batch(&self, batch_id: &BatchId) -> AnalyticsResult<Option<BatchSummary>>;

    async fn find_course(&self, course_id: &CourseId) -> AnalyticsResult<Option<CourseSummary>>;

    async fn batch_count(&self, course_id: &CourseId) -> AnalyticsResult<i64>;

    /// Whether `instructor_id` teaches at least one batch of the course
    async fn teaches_course(&self, course_id: &CourseId, instructor_id: &UserId)
    -> AnalyticsResult<bool>;

    async fn completed_payments(&self, window: &TimeWindow)
    -> AnalyticsResult<Vec<CompletedPayment>>;
}
