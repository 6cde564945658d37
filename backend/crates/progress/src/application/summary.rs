//! Read models returned by the dashboard and overview use cases

use chrono::{DateTime, Utc};
use kernel::id::{BatchId, StudentId};
use serde::Serialize;

use crate::domain::entity::progress_record::ProgressRecord;
use crate::domain::value_object::risk::RiskFactor;

/// One student's standing in one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressSummary {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub overall_progress: f64,
    pub material_percent: f64,
    pub attendance_percent: f64,
    pub assignment_percent: f64,
    pub is_at_risk: bool,
    pub risk_factors: Vec<RiskFactor>,
    pub current_streak: u32,
    pub last_learning_activity_at: DateTime<Utc>,
}

impl From<&ProgressRecord> for StudentProgressSummary {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            student_id: record.student_id,
            batch_id: record.batch_id,
            overall_progress: record.overall_progress,
            material_percent: record.material_percent,
            attendance_percent: record.attendance_percent,
            assignment_percent: record.assignment_percent,
            is_at_risk: record.is_at_risk(),
            risk_factors: record.risk_factors.clone(),
            current_streak: record.streak.current,
            last_learning_activity_at: record.last_learning_activity_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDashboard {
    pub batch_id: BatchId,
    pub total_students: usize,
    pub average_progress: f64,
    /// Share of students with overall progress at 100, in percent
    pub completion_rate: f64,
    pub at_risk_count: usize,
    /// All students, best first
    pub students: Vec<StudentProgressSummary>,
    pub top_performers: Vec<StudentProgressSummary>,
    /// At-risk students among the lowest ranked
    pub needs_attention: Vec<StudentProgressSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub student_id: StudentId,
    pub batches: Vec<StudentProgressSummary>,
    pub average_progress: f64,
    pub at_risk_batches: usize,
}

pub(crate) fn average<'a>(values: impl Iterator<Item = &'a StudentProgressSummary>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), s| {
        (sum + s.overall_progress, count + 1)
    });
    if count == 0 { 0.0 } else { sum / count as f64 }
}
