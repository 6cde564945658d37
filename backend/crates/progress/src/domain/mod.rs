//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    coursework::Coursework, enrollment::Enrollment, progress_record::ProgressRecord,
};
pub use repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
