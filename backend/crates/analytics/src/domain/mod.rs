//! Domain Layer
//!
//! Report types, pure aggregation rules and the source trait.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use repository::AnalyticsSource;
pub use value_object::{scope::Scope, time_range::TimeRange};
