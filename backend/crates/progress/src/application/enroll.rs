//! Enroll Student Use Case

use chrono::Utc;
use kernel::id::{BatchId, StudentId};
use std::sync::Arc;

use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::EnrollmentRepository;
use crate::domain::value_object::status::PaymentPlan;
use crate::error::{ProgressError, ProgressResult};

pub struct EnrollStudentUseCase<E>
where
    E: EnrollmentRepository + Send + Sync + 'static,
{
    enrollment_repo: Arc<E>,
}

impl<E> EnrollStudentUseCase<E>
where
    E: EnrollmentRepository + Send + Sync + 'static,
{
    pub fn new(enrollment_repo: Arc<E>) -> Self {
        Self { enrollment_repo }
    }

    /// Create an active enrollment; at most one per (student, batch)
    pub async fn execute(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
        payment_plan: PaymentPlan,
    ) -> ProgressResult<Enrollment> {
        if !self.enrollment_repo.batch_exists(batch_id).await? {
            return Err(ProgressError::BatchNotFound);
        }
        if self
            .enrollment_repo
            .find_active(student_id, batch_id)
            .await?
            .is_some()
        {
            return Err(ProgressError::AlreadyEnrolled);
        }

        // The unique index still guards the window between check and insert
        let enrollment = Enrollment::new(*student_id, *batch_id, payment_plan, Utc::now());
        self.enrollment_repo.create(&enrollment).await?;

        tracing::info!(
            student_id = %student_id,
            batch_id = %batch_id,
            payment_plan = %payment_plan,
            "Student enrolled"
        );

        Ok(enrollment)
    }
}
