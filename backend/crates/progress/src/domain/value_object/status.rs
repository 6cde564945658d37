//! Status enums shared with the rest of the platform's collections
//!
//! Stored as lowercase text; `FromStr` reads them back from storage.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProgressError;

fn unknown(what: &str, value: &str) -> ProgressError {
    ProgressError::Internal(format!("Unknown {what} in storage: {value}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[display("active")]
    Active,
    #[display("completed")]
    Completed,
    #[display("dropped")]
    Dropped,
    #[display("suspended")]
    Suspended,
}

impl EnrollmentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
            EnrollmentStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            "suspended" => Ok(EnrollmentStatus::Suspended),
            other => Err(unknown("enrollment status", other)),
        }
    }
}

/// How the enrollment fee is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPlan {
    #[display("full")]
    Full,
    #[display("emi")]
    Emi,
}

impl PaymentPlan {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentPlan::Full => "full",
            PaymentPlan::Emi => "emi",
        }
    }
}

impl FromStr for PaymentPlan {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(PaymentPlan::Full),
            "emi" => Ok(PaymentPlan::Emi),
            other => Err(unknown("payment plan", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    #[display("not_started")]
    NotStarted,
    #[display("in_progress")]
    InProgress,
    #[display("completed")]
    Completed,
}

impl FromStr for MaterialStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(MaterialStatus::NotStarted),
            "in_progress" => Ok(MaterialStatus::InProgress),
            "completed" => Ok(MaterialStatus::Completed),
            other => Err(unknown("material status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[display("present")]
    Present,
    #[display("late")]
    Late,
    #[display("absent")]
    Absent,
    #[display("excused")]
    Excused,
}

impl AttendanceStatus {
    /// Present and late both count as attended
    #[inline]
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl FromStr for AttendanceStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            "excused" => Ok(AttendanceStatus::Excused),
            other => Err(unknown("attendance status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[display("submitted")]
    Submitted,
    #[display("late")]
    Late,
    #[display("graded")]
    Graded,
}

impl FromStr for SubmissionStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "late" => Ok(SubmissionStatus::Late),
            "graded" => Ok(SubmissionStatus::Graded),
            other => Err(unknown("submission status", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attended_statuses() {
        assert!(AttendanceStatus::Present.counts_as_attended());
        assert!(AttendanceStatus::Late.counts_as_attended());
        assert!(!AttendanceStatus::Absent.counts_as_attended());
        assert!(!AttendanceStatus::Excused.counts_as_attended());
    }

    #[test]
    fn test_storage_codes_parse_back() {
        assert_eq!(
            EnrollmentStatus::Active.code().parse::<EnrollmentStatus>().unwrap(),
            EnrollmentStatus::Active
        );
        assert_eq!("emi".parse::<PaymentPlan>().unwrap(), PaymentPlan::Emi);
        assert_eq!(
            MaterialStatus::InProgress.to_string().parse::<MaterialStatus>().unwrap(),
            MaterialStatus::InProgress
        );
        assert!("paused".parse::<SubmissionStatus>().is_err());
    }
}
