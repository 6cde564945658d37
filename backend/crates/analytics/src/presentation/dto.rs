//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::value_object::time_range::TimeRange;
use crate::error::AnalyticsResult;

/// `?range=24h|7d|30d|90d|1y`, 30 days when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    pub fn time_range(&self) -> AnalyticsResult<TimeRange> {
        match self.range.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(TimeRange::default()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClearCacheRequest {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub removed: u64,
}
