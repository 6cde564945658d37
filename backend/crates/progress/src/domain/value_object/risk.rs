//! Risk Factors
//!
//! Each rule is independent; every rule that fires contributes one factor
//! carrying the worse of its two severities.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Days without learning activity before a student is flagged
pub const INACTIVITY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    #[display("low_attendance")]
    LowAttendance,
    #[display("low_material_completion")]
    LowMaterialCompletion,
    #[display("low_assignment_completion")]
    LowAssignmentCompletion,
    #[display("inactive")]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub severity: Severity,
    /// Observed value: a percentage, or days for inactivity
    pub value: f64,
    pub message: String,
}

/// Inputs of the risk rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    pub attendance_percent: f64,
    pub material_percent: f64,
    pub assignment_percent: f64,
    pub days_inactive: i64,
}

/// `(high below, medium below)` thresholds
const ATTENDANCE: (f64, f64) = (50.0, 70.0);
const MATERIALS: (f64, f64) = (40.0, 60.0);
const ASSIGNMENTS: (f64, f64) = (30.0, 50.0);

pub fn assess(inputs: &RiskInputs) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if let Some(severity) = below(inputs.attendance_percent, ATTENDANCE) {
        factors.push(RiskFactor {
            category: RiskCategory::LowAttendance,
            severity,
            value: inputs.attendance_percent,
            message: format!("Attendance at {:.1}%", inputs.attendance_percent),
        });
    }

    if let Some(severity) = below(inputs.material_percent, MATERIALS) {
        factors.push(RiskFactor {
            category: RiskCategory::LowMaterialCompletion,
            severity,
            value: inputs.material_percent,
            message: format!("Material completion at {:.1}%", inputs.material_percent),
        });
    }

    if let Some(severity) = below(inputs.assignment_percent, ASSIGNMENTS) {
        factors.push(RiskFactor {
            category: RiskCategory::LowAssignmentCompletion,
            severity,
            value: inputs.assignment_percent,
            message: format!("Assignment completion at {:.1}%", inputs.assignment_percent),
        });
    }

    if inputs.days_inactive > INACTIVITY_DAYS {
        factors.push(RiskFactor {
            category: RiskCategory::Inactive,
            severity: Severity::High,
            value: inputs.days_inactive as f64,
            message: format!("No learning activity for {} days", inputs.days_inactive),
        });
    }

    factors
}

fn below(value: f64, (high, medium): (f64, f64)) -> Option<Severity> {
    if value < high {
        Some(Severity::High)
    } else if value < medium {
        Some(Severity::Medium)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> RiskInputs {
        RiskInputs {
            attendance_percent: 90.0,
            material_percent: 80.0,
            assignment_percent: 75.0,
            days_inactive: 1,
        }
    }

    fn severity_of(factors: &[RiskFactor], category: RiskCategory) -> Option<Severity> {
        factors
            .iter()
            .find(|f| f.category == category)
            .map(|f| f.severity)
    }

    #[test]
    fn test_healthy_student_has_no_factors() {
        assert!(assess(&healthy()).is_empty());
    }

    #[test]
    fn test_attendance_thresholds() {
        let medium = assess(&RiskInputs {
            attendance_percent: 65.0,
            ..healthy()
        });
        assert_eq!(
            severity_of(&medium, RiskCategory::LowAttendance),
            Some(Severity::Medium)
        );

        let high = assess(&RiskInputs {
            attendance_percent: 49.9,
            ..healthy()
        });
        assert_eq!(high.len(), 1);
        assert_eq!(
            severity_of(&high, RiskCategory::LowAttendance),
            Some(Severity::High)
        );

        // Boundaries are exclusive
        assert!(
            assess(&RiskInputs {
                attendance_percent: 70.0,
                ..healthy()
            })
            .is_empty()
        );
    }

    #[test]
    fn test_material_and_assignment_thresholds() {
        let factors = assess(&RiskInputs {
            material_percent: 55.0,
            assignment_percent: 20.0,
            ..healthy()
        });
        assert_eq!(
            severity_of(&factors, RiskCategory::LowMaterialCompletion),
            Some(Severity::Medium)
        );
        assert_eq!(
            severity_of(&factors, RiskCategory::LowAssignmentCompletion),
            Some(Severity::High)
        );
    }

    #[test]
    fn test_inactivity_after_seven_days() {
        assert!(
            assess(&RiskInputs {
                days_inactive: 7,
                ..healthy()
            })
            .is_empty()
        );
        let factors = assess(&RiskInputs {
            days_inactive: 8,
            ..healthy()
        });
        assert_eq!(
            severity_of(&factors, RiskCategory::Inactive),
            Some(Severity::High)
        );
    }
}
