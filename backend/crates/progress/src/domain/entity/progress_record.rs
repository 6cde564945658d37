//! Progress Record Entity
//!
//! One record per (student, batch). Everything derived (percentages, risk
//! factors) is recomputed from a [`Coursework`] snapshot in
//! [`ProgressRecord::recompute`]; nothing derived is ever set on its own.

use chrono::{DateTime, Utc};
use kernel::id::{
    AssignmentId, BatchId, LiveSessionId, MaterialId, ProgressRecordId, StudentId, SubmissionId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::entity::coursework::{Coursework, MaterialActivity, SubmissionRef};
use crate::domain::value_object::risk::{self, RiskFactor, RiskInputs};
use crate::domain::value_object::status::{AttendanceStatus, MaterialStatus, SubmissionStatus};
use crate::domain::value_object::streak::{Streak, StreakUpdate};

pub const MATERIAL_WEIGHT: f64 = 0.4;
pub const ATTENDANCE_WEIGHT: f64 = 0.2;
pub const ASSIGNMENT_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProgressItem {
    pub material_id: MaterialId,
    pub title: String,
    pub status: MaterialStatus,
    pub percent: f64,
    pub time_spent_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttendanceItem {
    pub session_id: LiveSessionId,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    /// `absent` when the student has no attendance mark
    pub status: AttendanceStatus,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentProgressItem {
    pub assignment_id: AssignmentId,
    pub title: String,
    pub submission_id: Option<SubmissionId>,
    pub status: Option<SubmissionStatus>,
    pub score: Option<f64>,
    pub max_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCounts {
    pub materials_total: u32,
    pub materials_completed: u32,
    pub sessions_total: u32,
    pub sessions_attended: u32,
    pub assignments_total: u32,
    pub assignments_submitted: u32,
    pub assignments_graded: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: ProgressRecordId,
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub material_progress: Vec<MaterialProgressItem>,
    pub session_attendance: Vec<SessionAttendanceItem>,
    pub assignment_progress: Vec<AssignmentProgressItem>,
    pub counts: ProgressCounts,
    pub material_percent: f64,
    pub attendance_percent: f64,
    pub assignment_percent: f64,
    pub overall_progress: f64,
    /// Mean graded score as a percentage of the maximum
    pub average_score: Option<f64>,
    pub risk_factors: Vec<RiskFactor>,
    pub streak: Streak,
    /// Latest material access, session join or submission (enrollment date if none)
    pub last_learning_activity_at: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Empty record, not yet calculated
    pub fn new(student_id: StudentId, batch_id: BatchId, now: DateTime<Utc>) -> Self {
        Self {
            id: ProgressRecordId::new(),
            student_id,
            batch_id,
            material_progress: Vec::new(),
            session_attendance: Vec::new(),
            assignment_progress: Vec::new(),
            counts: ProgressCounts::default(),
            material_percent: 0.0,
            attendance_percent: 0.0,
            assignment_percent: 0.0,
            overall_progress: 0.0,
            average_score: None,
            risk_factors: Vec::new(),
            streak: Streak::default(),
            last_learning_activity_at: now,
            calculated_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild every derived field from `coursework`
    pub fn recompute(
        &mut self,
        coursework: &Coursework,
        enrolled_at: DateTime<Utc>,
        now: DateTime<Utc>,
        update: StreakUpdate,
    ) {
        self.material_progress = material_items(coursework);
        self.session_attendance = session_items(coursework);
        self.assignment_progress = assignment_items(coursework);

        let counts = ProgressCounts {
            materials_total: self.material_progress.len() as u32,
            materials_completed: self
                .material_progress
                .iter()
                .filter(|m| m.status == MaterialStatus::Completed)
                .count() as u32,
            sessions_total: self.session_attendance.len() as u32,
            sessions_attended: self
                .session_attendance
                .iter()
                .filter(|s| s.status.counts_as_attended())
                .count() as u32,
            assignments_total: self.assignment_progress.len() as u32,
            assignments_submitted: self
                .assignment_progress
                .iter()
                .filter(|a| a.submission_id.is_some())
                .count() as u32,
            assignments_graded: self
                .assignment_progress
                .iter()
                .filter(|a| a.status == Some(SubmissionStatus::Graded))
                .count() as u32,
        };
        self.counts = counts;

        self.material_percent = percent(counts.materials_completed, counts.materials_total);
        self.attendance_percent = percent(counts.sessions_attended, counts.sessions_total);
        self.assignment_percent = percent(counts.assignments_submitted, counts.assignments_total);
        self.overall_progress = overall(
            self.material_percent,
            self.attendance_percent,
            self.assignment_percent,
        );
        self.average_score = average_score(&self.assignment_progress);

        self.last_learning_activity_at = coursework
            .last_learning_activity()
            .map_or(enrolled_at, |last| last.max(enrolled_at));

        self.risk_factors = risk::assess(&RiskInputs {
            attendance_percent: self.attendance_percent,
            material_percent: self.material_percent,
            assignment_percent: self.assignment_percent,
            days_inactive: self.days_inactive(now),
        });

        if update == StreakUpdate::Touch {
            self.streak.touch(now);
        }

        self.calculated_at = now;
        self.updated_at = now;
    }

    /// Derived from the risk factors, never stored independently
    #[inline]
    pub fn is_at_risk(&self) -> bool {
        !self.risk_factors.is_empty()
    }

    /// Whole days since the last learning activity
    pub fn days_inactive(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_learning_activity_at).num_days().max(0)
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.overall_progress >= 100.0
    }
}

/// `completed / total * 100`, 0 for an empty category
pub fn percent(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        (completed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

pub fn overall(material: f64, attendance: f64, assignment: f64) -> f64 {
    (MATERIAL_WEIGHT * material + ATTENDANCE_WEIGHT * attendance + ASSIGNMENT_WEIGHT * assignment)
        .clamp(0.0, 100.0)
}

fn material_items(coursework: &Coursework) -> Vec<MaterialProgressItem> {
    let activity: HashMap<MaterialId, &MaterialActivity> = coursework
        .material_activity
        .iter()
        .map(|a| (a.material_id, a))
        .collect();

    coursework
        .materials
        .iter()
        .map(|m| {
            let own = activity.get(&m.material_id);
            MaterialProgressItem {
                material_id: m.material_id,
                title: m.title.clone(),
                status: own.map_or(MaterialStatus::NotStarted, |a| a.status),
                percent: own.map_or(0.0, |a| a.percent.clamp(0.0, 100.0)),
                time_spent_secs: own.map_or(0, |a| a.time_spent_secs),
            }
        })
        .collect()
}

fn session_items(coursework: &Coursework) -> Vec<SessionAttendanceItem> {
    coursework
        .sessions
        .iter()
        .map(|s| {
            let mark = coursework
                .attendance
                .iter()
                .find(|a| a.session_id == s.session_id);
            SessionAttendanceItem {
                session_id: s.session_id,
                title: s.title.clone(),
                scheduled_at: s.scheduled_at,
                status: mark.map_or(AttendanceStatus::Absent, |a| a.status),
                duration_minutes: mark.map_or(0, |a| a.duration_minutes),
            }
        })
        .collect()
}

fn assignment_items(coursework: &Coursework) -> Vec<AssignmentProgressItem> {
    let mut latest: HashMap<AssignmentId, &SubmissionRef> = HashMap::new();
    for submission in &coursework.submissions {
        latest
            .entry(submission.assignment_id)
            .and_modify(|current| {
                if submission.submitted_at > current.submitted_at {
                    *current = submission;
                }
            })
            .or_insert(submission);
    }

    coursework
        .assignments
        .iter()
        .map(|a| {
            let submission = latest.get(&a.assignment_id);
            AssignmentProgressItem {
                assignment_id: a.assignment_id,
                title: a.title.clone(),
                submission_id: submission.map(|s| s.submission_id),
                status: submission.map(|s| s.status),
                score: submission.and_then(|s| s.score),
                max_score: a.max_score,
            }
        })
        .collect()
}

fn average_score(items: &[AssignmentProgressItem]) -> Option<f64> {
    let scores: Vec<f64> = items
        .iter()
        .filter(|a| a.max_score > 0.0)
        .filter_map(|a| a.score.map(|score| score / a.max_score * 100.0))
        .collect();

    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::coursework::{
        AssignmentRef, AttendanceMark, MaterialRef, SessionRef,
    };
    use crate::domain::value_object::risk::RiskCategory;
    use chrono::Duration;

    fn coursework(now: DateTime<Utc>) -> Coursework {
        let materials: Vec<MaterialRef> = (0..4)
            .map(|i| MaterialRef {
                material_id: MaterialId::new(),
                title: format!("Material {i}"),
            })
            .collect();
        let sessions: Vec<SessionRef> = (0..5)
            .map(|i| SessionRef {
                session_id: LiveSessionId::new(),
                title: format!("Session {i}"),
                scheduled_at: now - Duration::days(i),
            })
            .collect();
        let assignments: Vec<AssignmentRef> = (0..2)
            .map(|i| AssignmentRef {
                assignment_id: AssignmentId::new(),
                title: format!("Assignment {i}"),
                max_score: 50.0,
                due_at: None,
            })
            .collect();

        Coursework {
            material_activity: vec![
                MaterialActivity {
                    material_id: materials[0].material_id,
                    status: MaterialStatus::Completed,
                    percent: 100.0,
                    time_spent_secs: 600,
                    last_accessed_at: Some(now - Duration::days(2)),
                },
                MaterialActivity {
                    material_id: materials[1].material_id,
                    status: MaterialStatus::Completed,
                    percent: 100.0,
                    time_spent_secs: 300,
                    last_accessed_at: Some(now - Duration::days(1)),
                },
                MaterialActivity {
                    material_id: materials[2].material_id,
                    status: MaterialStatus::InProgress,
                    percent: 40.0,
                    time_spent_secs: 120,
                    last_accessed_at: None,
                },
            ],
            attendance: vec![
                AttendanceMark {
                    session_id: sessions[0].session_id,
                    status: AttendanceStatus::Present,
                    duration_minutes: 60,
                    joined_at: None,
                },
                AttendanceMark {
                    session_id: sessions[1].session_id,
                    status: AttendanceStatus::Late,
                    duration_minutes: 45,
                    joined_at: None,
                },
                AttendanceMark {
                    session_id: sessions[2].session_id,
                    status: AttendanceStatus::Absent,
                    duration_minutes: 0,
                    joined_at: None,
                },
            ],
            submissions: vec![SubmissionRef {
                submission_id: SubmissionId::new(),
                assignment_id: assignments[0].assignment_id,
                status: SubmissionStatus::Graded,
                score: Some(40.0),
                submitted_at: now - Duration::days(3),
            }],
            materials,
            sessions,
            assignments,
        }
    }

    #[test]
    fn test_percentages_and_weighted_overall() {
        let now = Utc::now();
        let mut record = ProgressRecord::new(StudentId::new(), BatchId::new(), now);
        record.recompute(&coursework(now), now - Duration::days(30), now, StreakUpdate::Touch);

        assert_eq!(record.counts.materials_completed, 2);
        assert_eq!(record.counts.sessions_attended, 2);
        assert_eq!(record.counts.assignments_submitted, 1);
        assert_eq!(record.counts.assignments_graded, 1);
        assert_eq!(record.material_percent, 50.0);
        assert_eq!(record.attendance_percent, 40.0);
        assert_eq!(record.assignment_percent, 50.0);

        let expected = 0.4 * 50.0 + 0.2 * 40.0 + 0.4 * 50.0;
        assert!((record.overall_progress - expected).abs() < 1e-9);
        assert_eq!(record.average_score, Some(80.0));
        assert_eq!(record.last_learning_activity_at, now - Duration::days(1));
    }

    #[test]
    fn test_at_risk_follows_factors() {
        let now = Utc::now();
        let mut record = ProgressRecord::new(StudentId::new(), BatchId::new(), now);
        record.recompute(&coursework(now), now - Duration::days(30), now, StreakUpdate::Keep);

        // attendance 40 (high), materials 50 (medium), assignments 50 (none)
        assert!(record.is_at_risk());
        let categories: Vec<RiskCategory> =
            record.risk_factors.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![
                RiskCategory::LowAttendance,
                RiskCategory::LowMaterialCompletion
            ]
        );
        assert_eq!(record.streak, Streak::default());
    }

    #[test]
    fn test_inactivity_falls_back_to_enrollment_date() {
        let now = Utc::now();
        let mut record = ProgressRecord::new(StudentId::new(), BatchId::new(), now);
        record.recompute(
            &Coursework::default(),
            now - Duration::days(10),
            now,
            StreakUpdate::Keep,
        );

        assert_eq!(record.days_inactive(now), 10);
        assert!(
            record
                .risk_factors
                .iter()
                .any(|f| f.category == RiskCategory::Inactive)
        );
        assert_eq!(record.overall_progress, 0.0);
    }

    #[test]
    fn test_latest_submission_wins() {
        let now = Utc::now();
        let assignment = AssignmentRef {
            assignment_id: AssignmentId::new(),
            title: "Essay".to_string(),
            max_score: 100.0,
            due_at: None,
        };
        let first = SubmissionRef {
            submission_id: SubmissionId::new(),
            assignment_id: assignment.assignment_id,
            status: SubmissionStatus::Graded,
            score: Some(30.0),
            submitted_at: now - Duration::days(2),
        };
        let resubmission = SubmissionRef {
            submission_id: SubmissionId::new(),
            submitted_at: now - Duration::days(1),
            status: SubmissionStatus::Submitted,
            score: None,
            ..first.clone()
        };
        let coursework = Coursework {
            assignments: vec![assignment],
            submissions: vec![first, resubmission.clone()],
            ..Coursework::default()
        };

        let items = assignment_items(&coursework);
        assert_eq!(items[0].submission_id, Some(resubmission.submission_id));
        assert_eq!(items[0].score, None);
    }

    #[test]
    fn test_percent_of_empty_category_is_zero() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(3, 3), 100.0);
        assert_eq!(overall(100.0, 100.0, 100.0), 100.0);
    }
}
