//! Coursework Snapshot
//!
//! What a batch offers and what one student did with it, as read from the
//! material, session, assignment and submission collections. Only items
//! that count towards progress are included: published materials and
//! assignments, sessions that are ongoing or completed.

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, LiveSessionId, MaterialId, SubmissionId};

use crate::domain::value_object::status::{AttendanceStatus, MaterialStatus, SubmissionStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRef {
    pub material_id: MaterialId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRef {
    pub session_id: LiveSessionId,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRef {
    pub assignment_id: AssignmentId,
    pub title: String,
    pub max_score: f64,
    pub due_at: Option<DateTime<Utc>>,
}

/// The student's state on one material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialActivity {
    pub material_id: MaterialId,
    pub status: MaterialStatus,
    pub percent: f64,
    pub time_spent_secs: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub session_id: LiveSessionId,
    pub status: AttendanceStatus,
    pub duration_minutes: i32,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRef {
    pub submission_id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub status: SubmissionStatus,
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coursework {
    pub materials: Vec<MaterialRef>,
    pub sessions: Vec<SessionRef>,
    pub assignments: Vec<AssignmentRef>,
    pub material_activity: Vec<MaterialActivity>,
    pub attendance: Vec<AttendanceMark>,
    pub submissions: Vec<SubmissionRef>,
}

impl Coursework {
    /// Latest material access, session join or submission
    pub fn last_learning_activity(&self) -> Option<DateTime<Utc>> {
        let material = self
            .material_activity
            .iter()
            .filter_map(|a| a.last_accessed_at);
        let sessions = self.attendance.iter().filter_map(|a| a.joined_at);
        let submissions = self.submissions.iter().map(|s| s.submitted_at);

        material.chain(sessions).chain(submissions).max()
    }
}
