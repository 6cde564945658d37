//! Progress Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::ProgressConfig;
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::infra::postgres::PgProgressRepository;
use crate::presentation::handlers::{self, ProgressAppState};

/// Create the Progress router with PostgreSQL repository
pub fn progress_router(repo: PgProgressRepository, config: ProgressConfig) -> Router {
    progress_router_generic(repo, config)
}

/// Create a generic Progress router for any repository implementation
pub fn progress_router_generic<R>(repo: R, config: ProgressConfig) -> Router
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let state = ProgressAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/students/{student_id}/batches/{batch_id}/calculate",
            post(handlers::calculate::<R>),
        )
        .route(
            "/students/{student_id}/overview",
            get(handlers::student_overview::<R>),
        )
        .route(
            "/batches/{batch_id}/dashboard",
            get(handlers::batch_dashboard::<R>),
        )
        .route(
            "/batches/{batch_id}/at-risk",
            get(handlers::at_risk_students::<R>),
        )
        .route("/enrollments", post(handlers::enroll::<R>))
        .with_state(state)
}
