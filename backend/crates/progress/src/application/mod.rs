//! Application Layer
//!
//! Use cases and application services.

pub mod calculate;
pub mod config;
pub mod dashboard;
pub mod enroll;
pub mod overview;
pub mod summary;

// Re-exports
pub use calculate::CalculateProgressUseCase;
pub use config::ProgressConfig;
pub use dashboard::BatchDashboardUseCase;
pub use enroll::EnrollStudentUseCase;
pub use overview::StudentOverviewUseCase;
pub use summary::{BatchDashboard, StudentOverview, StudentProgressSummary};
