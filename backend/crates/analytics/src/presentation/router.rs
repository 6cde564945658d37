//! Analytics Router

use axum::{
    Router,
    routing::{get, post},
};
use cache::{CacheRepository, CacheService, PgCacheRepository};
use std::sync::Arc;

use crate::application::config::AnalyticsConfig;
use crate::application::service::AnalyticsService;
use crate::domain::repository::AnalyticsSource;
use crate::infra::postgres::PgAnalyticsSource;
use crate::presentation::handlers::{self, AnalyticsAppState};

/// Create the Analytics router over PostgreSQL
pub fn analytics_router(
    source: PgAnalyticsSource,
    cache: CacheService<PgCacheRepository>,
    config: AnalyticsConfig,
) -> Router {
    analytics_router_generic(source, cache, config)
}

/// Create a generic Analytics router for any source and cache backend
pub fn analytics_router_generic<S, C>(
    source: S,
    cache: CacheService<C>,
    config: AnalyticsConfig,
) -> Router
where
    S: AnalyticsSource + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    let state = AnalyticsAppState {
        service: AnalyticsService::new(Arc::new(source), cache, Arc::new(config)),
    };

    Router::new()
        .route("/system", get(handlers::system::<S, C>))
        .route("/batches/{batch_id}", get(handlers::batch::<S, C>))
        .route("/courses/{course_id}", get(handlers::course::<S, C>))
        .route("/payments", get(handlers::payment_collection::<S, C>))
        .route("/cache/clear", post(handlers::clear_cache::<S, C>))
        .with_state(state)
}
