//! HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use cache::CacheRepository;
use kernel::id::{BatchId, CourseId};
use kernel::principal::{Principal, Role};

use crate::application::service::AnalyticsService;
use crate::domain::entity::report::{
    BatchAnalytics, CourseAnalytics, PaymentCollectionReport, SystemAnalytics,
};
use crate::domain::repository::AnalyticsSource;
use crate::error::AnalyticsResult;
use crate::presentation::dto::{ClearCacheRequest, ClearCacheResponse, RangeQuery};

const STAFF: &[Role] = &[Role::Instructor, Role::Admin];
const ADMIN: &[Role] = &[Role::Admin];

/// Shared state for analytics handlers
pub struct AnalyticsAppState<S, C>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    pub service: AnalyticsService<S, C>,
}

impl<S, C> Clone for AnalyticsAppState<S, C>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// GET /api/analytics/system?range=30d
pub async fn system<S, C>(
    State(state): State<AnalyticsAppState<S, C>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RangeQuery>,
) -> AnalyticsResult<Json<SystemAnalytics>>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    principal.require_role(ADMIN)?;
    Ok(Json(state.service.system(query.time_range()?).await?))
}

/// GET /api/analytics/batches/{batch_id}?range=30d
pub async fn batch<S, C>(
    State(state): State<AnalyticsAppState<S, C>>,
    Extension(principal): Extension<Principal>,
    Path(batch_id): Path<BatchId>,
    Query(query): Query<RangeQuery>,
) -> AnalyticsResult<Json<BatchAnalytics>>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    principal.require_role(STAFF)?;
    state.service.authorize_batch(&principal, &batch_id).await?;
    Ok(Json(
        state.service.batch(&batch_id, query.time_range()?).await?,
    ))
}

/// GET /api/analytics/courses/{course_id}?range=30d
pub async fn course<S, C>(
    State(state): State<AnalyticsAppState<S, C>>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<CourseId>,
    Query(query): Query<RangeQuery>,
) -> AnalyticsResult<Json<CourseAnalytics>>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    principal.require_role(STAFF)?;
    state.service.authorize_course(&principal, &course_id).await?;
    Ok(Json(
        state.service.course(&course_id, query.time_range()?).await?,
    ))
}

/// GET /api/analytics/payments?range=90d
pub async fn payment_collection<S, C>(
    State(state): State<AnalyticsAppState<S, C>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RangeQuery>,
) -> AnalyticsResult<Json<PaymentCollectionReport>>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    principal.require_role(ADMIN)?;
    Ok(Json(
        state.service.payment_collection(query.time_range()?).await?,
    ))
}

/// POST /api/analytics/cache/clear
pub async fn clear_cache<S, C>(
    State(state): State<AnalyticsAppState<S, C>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ClearCacheRequest>,
) -> AnalyticsResult<Json<ClearCacheResponse>>
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    principal.require_role(ADMIN)?;
    let removed = state.service.clear_cache(&req.patterns).await?;
    Ok(Json(ClearCacheResponse { removed }))
}
