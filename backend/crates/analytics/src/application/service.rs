//! Analytics Service
//!
//! Cache-aside reports: look the key up first, compute on a miss and store
//! the result before returning. The cache is best effort; its failures are
//! logged and the report is computed from the source instead.

use chrono::Utc;
use kernel::id::{BatchId, CourseId};
use kernel::principal::{Principal, Role};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cache::domain::KeyPattern;
use cache::{CacheError, CacheRepository, CacheService};

use crate::application::config::AnalyticsConfig;
use crate::domain::entity::metrics::{EngagementMetrics, FinancialSummary};
use crate::domain::entity::report::{
    BatchAnalytics, CourseAnalytics, PaymentCollectionReport, SystemAnalytics,
};
use crate::domain::repository::AnalyticsSource;
use crate::domain::value_object::{scope::Scope, time_range::TimeRange};
use crate::error::{AnalyticsError, AnalyticsResult};

pub fn system_key(range: TimeRange) -> String {
    format!("analytics:system:{range}")
}

pub fn batch_key(batch_id: &BatchId, range: TimeRange) -> String {
    format!("analytics:batch:{batch_id}:{range}")
}

pub fn course_key(course_id: &CourseId, range: TimeRange) -> String {
    format!("analytics:course:{course_id}:{range}")
}

pub fn payments_key(range: TimeRange) -> String {
    format!("analytics:payments:{range}")
}

pub struct AnalyticsService<S, C>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    source: Arc<S>,
    cache: CacheService<C>,
    config: Arc<AnalyticsConfig>,
}

impl<S, C> Clone for AnalyticsService<S, C>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, C> AnalyticsService<S, C>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    pub fn new(source: Arc<S>, cache: CacheService<C>, config: Arc<AnalyticsConfig>) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub async fn system(&self, range: TimeRange) -> AnalyticsResult<SystemAnalytics> {
        let ttl = self.config.ttl_for(range);
        self.cached(&system_key(range), ttl, move || async move {
            let now = Utc::now();
            let window = range.window(now);
            let scope = Scope::System;

            let (overview, financial, engagement) = tokio::try_join!(
                self.source.overview_counts(&window),
                self.source.financial_totals(&scope, &window),
                self.source.engagement_counts(&scope, &window),
            )?;

            tracing::debug!(range = %range, "System analytics computed");
            Ok(SystemAnalytics {
                time_range: range,
                window,
                overview,
                financial: FinancialSummary::from(financial),
                engagement: EngagementMetrics::from(engagement),
                generated_at: now,
            })
        })
        .await
    }

    pub async fn batch(&self, batch_id: &BatchId, range: TimeRange) -> AnalyticsResult<BatchAnalytics> {
        let ttl = self.config.ttl_for(range);
        self.cached(&batch_key(batch_id, range), ttl, move || async move {
            let batch = self
                .source
                .find_batch(batch_id)
                .await?
                .ok_or(AnalyticsError::BatchNotFound)?;

            let now = Utc::now();
            let window = range.window(now);
            let scope = Scope::Batch(*batch_id);

            let (enrollments, engagement, progress, financial) = tokio::try_join!(
                self.source.enrollment_breakdown(&scope),
                self.source.engagement_counts(&scope, &window),
                self.source.progress_summary(&scope),
                self.source.financial_totals(&scope, &window),
            )?;

            tracing::debug!(batch_id = %batch_id, range = %range, "Batch analytics computed");
            Ok(BatchAnalytics {
                time_range: range,
                window,
                batch,
                enrollments,
                engagement: EngagementMetrics::from(engagement),
                progress,
                revenue: FinancialSummary::from(financial),
                generated_at: now,
            })
        })
        .await
    }

    /// Instructors may only read batches they teach
    ///
    /// Unknown batches pass; [`Self::batch`] reports them as not found.
    pub async fn authorize_batch(
        &self,
        principal: &Principal,
        batch_id: &BatchId,
    ) -> AnalyticsResult<()> {
        if principal.role != Role::Instructor {
            return Ok(());
        }
        match self.source.find_batch(batch_id).await? {
            Some(batch) if batch.instructor_id != Some(principal.user_id) => Err(
                AnalyticsError::Forbidden("Instructors may only view their own batches".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Instructors may only read courses they teach a batch of
    pub async fn authorize_course(
        &self,
        principal: &Principal,
        course_id: &CourseId,
    ) -> AnalyticsResult<()> {
        if principal.role != Role::Instructor
            || self.source.teaches_course(course_id, &principal.user_id).await?
        {
            return Ok(());
        }
        match self.source.find_course(course_id).await? {
            Some(_) => Err(AnalyticsError::Forbidden(
                "Instructors may only view courses they teach".to_string(),
            )),
            None => Ok(()),
        }
    }

    pub async fn course(
        &self,
        course_id: &CourseId,
        range: TimeRange,
    ) -> AnalyticsResult<CourseAnalytics> {
        let ttl = self.config.ttl_for(range);
        self.cached(&course_key(course_id, range), ttl, move || async move {
            let course = self
                .source
                .find_course(course_id)
                .await?
                .ok_or(AnalyticsError::CourseNotFound)?;

            let now = Utc::now();
            let window = range.window(now);
            let scope = Scope::Course(*course_id);

            let (batch_count, enrollments, engagement, progress, financial) = tokio::try_join!(
                self.source.batch_count(course_id),
                self.source.enrollment_breakdown(&scope),
                self.source.engagement_counts(&scope, &window),
                self.source.progress_summary(&scope),
                self.source.financial_totals(&scope, &window),
            )?;

            tracing::debug!(course_id = %course_id, range = %range, "Course analytics computed");
            Ok(CourseAnalytics {
                time_range: range,
                window,
                course,
                batch_count,
                enrollments,
                engagement: EngagementMetrics::from(engagement),
                revenue: FinancialSummary::from(financial),
                average_progress: progress.average_progress,
                generated_at: now,
            })
        })
        .await
    }

    pub async fn payment_collection(
        &self,
        range: TimeRange,
    ) -> AnalyticsResult<PaymentCollectionReport> {
        let ttl = self.config.ttl_for(range);
        self.cached(&payments_key(range), ttl, move || async move {
            let now = Utc::now();
            let window = range.window(now);
            let payments = self.source.completed_payments(&window).await?;
            Ok(PaymentCollectionReport::build(range, window, &payments, now))
        })
        .await
    }

    /// Delete every entry matching any of `patterns`
    ///
    /// All patterns are validated before anything is deleted.
    pub async fn clear_cache(&self, patterns: &[String]) -> AnalyticsResult<u64> {
        if patterns.is_empty() {
            return Err(AnalyticsError::InvalidPattern("no patterns given".to_string()));
        }
        for pattern in patterns {
            KeyPattern::parse(pattern)?;
        }

        let mut removed = 0;
        for pattern in patterns {
            removed += self.cache.invalidate_pattern(pattern).await?;
        }

        tracing::info!(patterns = ?patterns, removed, "Analytics cache cleared");
        Ok(removed)
    }

    async fn cached<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> AnalyticsResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AnalyticsResult<T>>,
    {
        match self.cache.get::<T>(key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "Analytics cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => log_cache_failure("read", key, &e),
        }

        let report = compute().await?;

        if let Err(e) = self.cache.set(key, &report, ttl).await {
            log_cache_failure("write", key, &e);
        }
        Ok(report)
    }
}

fn log_cache_failure(op: &str, key: &str, err: &CacheError) {
    tracing::warn!(operation = %op, key = %key, error = %err, "Analytics cache unavailable");
}
