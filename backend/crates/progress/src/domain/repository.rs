//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{BatchId, StudentId, UserId};

use crate::domain::entity::{
    coursework::Coursework, enrollment::Enrollment, progress_record::ProgressRecord,
};
use crate::error::ProgressResult;

/// Progress record repository trait
#[trait_variant::make(ProgressRepository: Send)]
pub trait LocalProgressRepository {
    async fn find(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<ProgressRecord>>;

    async fn find_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<ProgressRecord>>;

    /// Insert or update on (student, batch); the stored `is_at_risk` column
    /// is written from [`ProgressRecord::is_at_risk`].
    async fn upsert(&self, record: &ProgressRecord) -> ProgressResult<()>;
}

/// Enrollment repository trait
#[trait_variant::make(EnrollmentRepository: Send)]
pub trait LocalEnrollmentRepository {
    async fn find_active(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<Enrollment>>;

    async fn list_active_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<Enrollment>>;

    async fn list_active_by_student(&self, student_id: &StudentId)
    -> ProgressResult<Vec<Enrollment>>;

    async fn batch_exists(&self, batch_id: &BatchId) -> ProgressResult<bool>;

    /// Whether `instructor_id` is the assigned instructor of the batch
    async fn teaches_batch(&self, batch_id: &BatchId, instructor_id: &UserId)
    -> ProgressResult<bool>;

    /// Fails with `AlreadyEnrolled` when an active enrollment for the pair exists
    async fn create(&self, enrollment: &Enrollment) -> ProgressResult<()>;
}

/// Read-only view over materials, sessions, assignments and the student's activity
#[trait_variant::make(CourseworkRepository: Send)]
pub trait LocalCourseworkRepository {
    async fn load(&self, student_id: &StudentId, batch_id: &BatchId)
    -> ProgressResult<Coursework>;
}
