//! Enrollment Entity

use chrono::{DateTime, Utc};
use kernel::id::{BatchId, EnrollmentId, StudentId};
use serde::Serialize;

use crate::domain::value_object::status::{EnrollmentStatus, PaymentPlan};

/// A student's registration in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub status: EnrollmentStatus,
    pub payment_plan: PaymentPlan,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// New active enrollment
    pub fn new(
        student_id: StudentId,
        batch_id: BatchId,
        payment_plan: PaymentPlan,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EnrollmentId::new(),
            student_id,
            batch_id,
            status: EnrollmentStatus::Active,
            payment_plan,
            enrolled_at: now,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}
