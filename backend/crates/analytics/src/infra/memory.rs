//! In-memory Analytics Source
//!
//! Serves seeded aggregates for tests and database-less runs. Every query
//! is counted so callers can observe how often the source was hit.

use kernel::id::{BatchId, CourseId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::entity::metrics::{
    BatchSummary, CompletedPayment, CourseSummary, EngagementCounts, EnrollmentBreakdown,
    FinancialTotals, OverviewCounts, ProgressSummary,
};
use crate::domain::repository::AnalyticsSource;
use crate::domain::value_object::{scope::Scope, time_range::TimeWindow};
use crate::error::AnalyticsResult;

#[derive(Default)]
struct State {
    overview: OverviewCounts,
    financial: HashMap<Scope, FinancialTotals>,
    engagement: HashMap<Scope, EngagementCounts>,
    enrollments: HashMap<Scope, EnrollmentBreakdown>,
    progress: HashMap<Scope, ProgressSummary>,
    batches: HashMap<BatchId, BatchSummary>,
    courses: HashMap<CourseId, CourseSummary>,
    payments: Vec<CompletedPayment>,
}

#[derive(Clone, Default)]
pub struct InMemoryAnalyticsSource {
    state: Arc<RwLock<State>>,
    queries: Arc<AtomicUsize>,
}

impl InMemoryAnalyticsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub async fn set_overview(&self, overview: OverviewCounts) {
        self.state.write().await.overview = overview;
    }

    pub async fn set_financial(&self, scope: Scope, totals: FinancialTotals) {
        self.state.write().await.financial.insert(scope, totals);
    }

    pub async fn set_engagement(&self, scope: Scope, counts: EngagementCounts) {
        self.state.write().await.engagement.insert(scope, counts);
    }

    pub async fn set_enrollments(&self, scope: Scope, breakdown: EnrollmentBreakdown) {
        self.state.write().await.enrollments.insert(scope, breakdown);
    }

    pub async fn set_progress(&self, scope: Scope, summary: ProgressSummary) {
        self.state.write().await.progress.insert(scope, summary);
    }

    pub async fn add_batch(&self, batch: BatchSummary) {
        self.state.write().await.batches.insert(batch.batch_id, batch);
    }

    pub async fn add_course(&self, course: CourseSummary) {
        self.state.write().await.courses.insert(course.course_id, course);
    }

    pub async fn add_payment(&self, payment: CompletedPayment) {
        self.state.write().await.payments.push(payment);
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl AnalyticsSource for InMemoryAnalyticsSource {
    async fn overview_counts(&self, _window: &TimeWindow) -> AnalyticsResult<OverviewCounts> {
        self.hit();
        Ok(self.state.read().await.overview)
    }

    async fn financial_totals(
        &self,
        scope: &Scope,
        _window: &TimeWindow,
    ) -> AnalyticsResult<FinancialTotals> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .financial
            .get(scope)
            .copied()
            .unwrap_or_default())
    }

    async fn engagement_counts(
        &self,
        scope: &Scope,
        _window: &TimeWindow,
    ) -> AnalyticsResult<EngagementCounts> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .engagement
            .get(scope)
            .copied()
            .unwrap_or_default())
    }

    async fn enrollment_breakdown(&self, scope: &Scope) -> AnalyticsResult<EnrollmentBreakdown> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .get(scope)
            .copied()
            .unwrap_or_default())
    }

    async fn progress_summary(&self, scope: &Scope) -> AnalyticsResult<ProgressSummary> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .progress
            .get(scope)
            .copied()
            .unwrap_or_default())
    }

    async fn find_batch(&self, batch_id: &BatchId) -> AnalyticsResult<Option<BatchSummary>> {
        self.hit();
        Ok(self.state.read().await.batches.get(batch_id).cloned())
    }

    async fn find_course(&self, course_id: &CourseId) -> AnalyticsResult<Option<CourseSummary>> {
        self.hit();
        Ok(self.state.read().await.courses.get(course_id).cloned())
    }

    async fn batch_count(&self, course_id: &CourseId) -> AnalyticsResult<i64> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .batches
            .values()
            .filter(|b| &b.course_id == course_id)
            .count() as i64)
    }

    async fn teaches_course(
        &self,
        course_id: &CourseId,
        instructor_id: &UserId,
    ) -> AnalyticsResult<bool> {
        self.hit();
        Ok(self
            .state
            .read()
            .await
            .batches
            .values()
            .any(|b| &b.course_id == course_id && b.instructor_id.as_ref() == Some(instructor_id)))
    }

    async fn completed_payments(
        &self,
        window: &TimeWindow,
    ) -> AnalyticsResult<Vec<CompletedPayment>> {
        self.hit();
        let mut payments: Vec<_> = self
            .state
            .read()
            .await
            .payments
            .iter()
            .filter(|p| p.paid_at >= window.start && p.paid_at <= window.end)
            .copied()
            .collect();
        payments.sort_by_key(|p| p.paid_at);
        Ok(payments)
    }
}
