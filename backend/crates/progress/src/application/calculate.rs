//! Calculate Progress Use Case
//!
//! Recomputes a student's record in a batch from the current coursework and
//! saves it. A call made on the student's behalf counts as their activity
//! and advances the streak; lazy creation for dashboards does not.

use chrono::Utc;
use kernel::id::{BatchId, StudentId};
use std::sync::Arc;

use crate::domain::entity::{enrollment::Enrollment, progress_record::ProgressRecord};
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::domain::value_object::streak::StreakUpdate;
use crate::error::{ProgressError, ProgressResult};

pub struct CalculateProgressUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    progress_repo: Arc<P>,
    enrollment_repo: Arc<E>,
    coursework_repo: Arc<C>,
}

impl<P, E, C> CalculateProgressUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    pub fn new(progress_repo: Arc<P>, enrollment_repo: Arc<E>, coursework_repo: Arc<C>) -> Self {
        Self {
            progress_repo,
            enrollment_repo,
            coursework_repo,
        }
    }

    /// Recalculate as the student's own activity
    pub async fn execute(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<ProgressRecord> {
        self.execute_with(student_id, batch_id, StreakUpdate::Touch)
            .await
    }

    /// Recalculate; `Keep` when someone other than the student asked
    pub async fn execute_with(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
        update: StreakUpdate,
    ) -> ProgressResult<ProgressRecord> {
        let enrollment = self
            .enrollment_repo
            .find_active(student_id, batch_id)
            .await?
            .ok_or(ProgressError::NotEnrolled)?;

        self.recalculate(&enrollment, update).await
    }

    /// Stored record, or one calculated now without touching the streak
    pub async fn find_or_calculate(&self, enrollment: &Enrollment) -> ProgressResult<ProgressRecord> {
        match self
            .progress_repo
            .find(&enrollment.student_id, &enrollment.batch_id)
            .await?
        {
            Some(record) => Ok(record),
            None => self.recalculate(enrollment, StreakUpdate::Keep).await,
        }
    }

    pub async fn recalculate(
        &self,
        enrollment: &Enrollment,
        update: StreakUpdate,
    ) -> ProgressResult<ProgressRecord> {
        let now = Utc::now();
        let coursework = self
            .coursework_repo
            .load(&enrollment.student_id, &enrollment.batch_id)
            .await?;

        let mut record = self
            .progress_repo
            .find(&enrollment.student_id, &enrollment.batch_id)
            .await?
            .unwrap_or_else(|| {
                ProgressRecord::new(enrollment.student_id, enrollment.batch_id, now)
            });

        record.recompute(&coursework, enrollment.enrolled_at, now, update);
        self.progress_repo.upsert(&record).await?;

        tracing::debug!(
            student_id = %record.student_id,
            batch_id = %record.batch_id,
            overall = record.overall_progress,
            at_risk = record.is_at_risk(),
            "Progress recalculated"
        );

        Ok(record)
    }
}
