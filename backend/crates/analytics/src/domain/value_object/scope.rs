//! Aggregation Scope

use kernel::id::{BatchId, CourseId};
use uuid::Uuid;

/// What a query aggregates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    System,
    Batch(BatchId),
    Course(CourseId),
}

impl Scope {
    /// `(batch filter, course filter)`; `None` means no restriction
    pub fn filters(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Scope::System => (None, None),
            Scope::Batch(id) => (Some(id.into_uuid()), None),
            Scope::Course(id) => (None, Some(id.into_uuid())),
        }
    }
}
