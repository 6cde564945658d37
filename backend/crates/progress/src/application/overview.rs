//! Student Overview Use Case

use kernel::id::StudentId;
use std::sync::Arc;

use crate::application::calculate::CalculateProgressUseCase;
use crate::application::summary::{StudentOverview, StudentProgressSummary, average};
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::error::ProgressResult;

pub struct StudentOverviewUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    enrollment_repo: Arc<E>,
    calculate: CalculateProgressUseCase<P, E, C>,
}

impl<P, E, C> StudentOverviewUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    pub fn new(progress_repo: Arc<P>, enrollment_repo: Arc<E>, coursework_repo: Arc<C>) -> Self {
        let calculate =
            CalculateProgressUseCase::new(progress_repo, enrollment_repo.clone(), coursework_repo);
        Self {
            enrollment_repo,
            calculate,
        }
    }

    /// One summary per active enrollment
    pub async fn execute(&self, student_id: &StudentId) -> ProgressResult<StudentOverview> {
        let enrollments = self.enrollment_repo.list_active_by_student(student_id).await?;

        let mut batches = Vec::with_capacity(enrollments.len());
        for enrollment in &enrollments {
            let record = self.calculate.find_or_calculate(enrollment).await?;
            batches.push(StudentProgressSummary::from(&record));
        }

        Ok(StudentOverview {
            student_id: *student_id,
            average_progress: average(batches.iter()),
            at_risk_batches: batches.iter().filter(|b| b.is_at_risk).count(),
            batches,
        })
    }
}
