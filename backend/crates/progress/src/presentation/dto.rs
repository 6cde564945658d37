//! API DTOs (Data Transfer Objects)

use kernel::id::{BatchId, StudentId};
use serde::{Deserialize, Serialize};

use crate::domain::entity::progress_record::ProgressRecord;
use crate::domain::value_object::status::PaymentPlan;

/// Full record plus the derived at-risk flag
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecordResponse {
    #[serde(flatten)]
    pub record: ProgressRecord,
    pub is_at_risk: bool,
    pub days_inactive: i64,
}

impl From<ProgressRecord> for ProgressRecordResponse {
    fn from(record: ProgressRecord) -> Self {
        Self {
            is_at_risk: record.is_at_risk(),
            days_inactive: record.days_inactive(chrono::Utc::now()),
            record,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtRiskQuery {
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_id: StudentId,
    pub batch_id: BatchId,
    pub payment_plan: PaymentPlan,
}
