//! Analytics Backend Module
//!
//! System, batch and course reports plus a payment collection report, all
//! served cache-aside through the `cache` crate.
//!
//! Clean Architecture structure:
//! - `domain/` - Report shapes, engagement weights, time ranges, source trait
//! - `application/` - `AnalyticsService`, configuration
//! - `infra/` - PostgreSQL and in-memory sources
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Engagement
//! overall = 0.3 x attendance + 0.25 x materials + 0.3 x submissions + 0.15 x doubts,
//! every rate measured against the students actually enrolled.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AnalyticsConfig, AnalyticsService};
pub use domain::{AnalyticsSource, Scope, TimeRange};
pub use error::{AnalyticsError, AnalyticsResult};
pub use infra::{InMemoryAnalyticsSource, PgAnalyticsSource};
pub use presentation::{analytics_router, analytics_router_generic};

pub mod models {
    pub use crate::domain::entity::metrics::*;
    pub use crate::domain::entity::report::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
