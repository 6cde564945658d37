//! Progress Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Progress records, risk rules, streaks, repository traits
//! - `application/` - Calculation, dashboards, overviews, enrollment
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Scoring
//! - overall = 0.4 x materials + 0.2 x attendance + 0.4 x assignments
//! - A student is at risk while any risk factor applies
//! - Streaks count consecutive UTC days with the student's own activity

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    BatchDashboardUseCase, CalculateProgressUseCase, EnrollStudentUseCase, ProgressConfig,
    StudentOverviewUseCase,
};
pub use error::{ProgressError, ProgressResult};
pub use infra::{InMemoryProgressRepository, PgProgressRepository};
pub use presentation::{progress_router, progress_router_generic};

pub mod models {
    pub use crate::application::summary::*;
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
