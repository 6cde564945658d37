//! Application Configuration

use std::time::Duration;

use crate::domain::value_object::time_range::TimeRange;

/// Analytics application configuration
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Lifetime of cached reports over the last 24 hours
    pub short_ttl: Duration,
    /// Lifetime of every other cached report
    pub default_ttl: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            short_ttl: Duration::from_secs(300),
            default_ttl: Duration::from_secs(3600),
        }
    }
}

impl AnalyticsConfig {
    pub fn development() -> Self {
        Self::default()
    }

    pub fn ttl_for(&self, range: TimeRange) -> Duration {
        if range.is_short() {
            self.short_ttl
        } else {
            self.default_ttl
        }
    }
}
