//! Batch Dashboard Use Case
//!
//! Instructor-facing views over every active enrollment of a batch.
//! Students without a record yet get one calculated on the spot.

use kernel::id::BatchId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::calculate::CalculateProgressUseCase;
use crate::application::config::ProgressConfig;
use crate::application::summary::{BatchDashboard, StudentProgressSummary, average};
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::domain::value_object::streak::StreakUpdate;
use crate::error::{ProgressError, ProgressResult};

pub struct BatchDashboardUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    progress_repo: Arc<P>,
    enrollment_repo: Arc<E>,
    calculate: CalculateProgressUseCase<P, E, C>,
    config: Arc<ProgressConfig>,
}

impl<P, E, C> BatchDashboardUseCase<P, E, C>
where
    P: ProgressRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    C: CourseworkRepository + Send + Sync + 'static,
{
    pub fn new(
        progress_repo: Arc<P>,
        enrollment_repo: Arc<E>,
        coursework_repo: Arc<C>,
        config: Arc<ProgressConfig>,
    ) -> Self {
        let calculate = CalculateProgressUseCase::new(
            progress_repo.clone(),
            enrollment_repo.clone(),
            coursework_repo,
        );
        Self {
            progress_repo,
            enrollment_repo,
            calculate,
            config,
        }
    }

    pub async fn dashboard(&self, batch_id: &BatchId) -> ProgressResult<BatchDashboard> {
        let students = self.load_summaries(batch_id).await?;
        let highlight = self.config.highlight_count;

        let total = students.len();
        let completed = students.iter().filter(|s| s.overall_progress >= 100.0).count();
        let at_risk_count = students.iter().filter(|s| s.is_at_risk).count();

        let top_performers = students.iter().take(highlight).cloned().collect();
        let needs_attention = students
            .iter()
            .rev()
            .take(highlight)
            .filter(|s| s.is_at_risk)
            .cloned()
            .collect();

        Ok(BatchDashboard {
            batch_id: *batch_id,
            total_students: total,
            average_progress: average(students.iter()),
            completion_rate: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64 * 100.0
            },
            at_risk_count,
            students,
            top_performers,
            needs_attention,
        })
    }

    /// Students whose overall progress is below `threshold`, lowest first
    pub async fn at_risk_students(
        &self,
        batch_id: &BatchId,
        threshold: Option<f64>,
    ) -> ProgressResult<Vec<StudentProgressSummary>> {
        let threshold = threshold.unwrap_or(self.config.at_risk_threshold);
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ProgressError::Validation(format!(
                "threshold must be within 0..=100, got {threshold}"
            )));
        }

        let mut students: Vec<StudentProgressSummary> = self
            .load_summaries(batch_id)
            .await?
            .into_iter()
            .filter(|s| s.overall_progress < threshold)
            .collect();
        students.reverse();
        Ok(students)
    }

    /// Summaries of all active enrollments, best first
    async fn load_summaries(&self, batch_id: &BatchId) -> ProgressResult<Vec<StudentProgressSummary>> {
        if !self.enrollment_repo.batch_exists(batch_id).await? {
            return Err(ProgressError::BatchNotFound);
        }

        let enrollments = self.enrollment_repo.list_active_by_batch(batch_id).await?;
        let mut stored: HashMap<_, _> = self
            .progress_repo
            .find_by_batch(batch_id)
            .await?
            .into_iter()
            .map(|r| (r.student_id, r))
            .collect();

        let mut summaries = Vec::with_capacity(enrollments.len());
        for enrollment in &enrollments {
            let record = match stored.remove(&enrollment.student_id) {
                Some(record) => record,
                None => {
                    self.calculate
                        .recalculate(enrollment, StreakUpdate::Keep)
                        .await?
                }
            };
            summaries.push(StudentProgressSummary::from(&record));
        }

        summaries.sort_by(|a, b| b.overall_progress.total_cmp(&a.overall_progress));
        Ok(summaries)
    }
}
