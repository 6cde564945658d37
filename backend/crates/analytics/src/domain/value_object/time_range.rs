//! Report Time Range

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Last24Hours,
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    LastYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Last24Hours,
        TimeRange::Last7Days,
        TimeRange::Last30Days,
        TimeRange::Last90Days,
        TimeRange::LastYear,
    ];

    /// Query-string and cache-key form; the only place the codes are spelled
    pub fn code(&self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
            TimeRange::Last90Days => "90d",
            TimeRange::LastYear => "1y",
        }
    }

    pub fn span(&self) -> Duration {
        match self {
            TimeRange::Last24Hours => Duration::hours(24),
            TimeRange::Last7Days => Duration::days(7),
            TimeRange::Last30Days => Duration::days(30),
            TimeRange::Last90Days => Duration::days(90),
            TimeRange::LastYear => Duration::days(365),
        }
    }

    /// `[now - span, now]`
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now - self.span(),
            end: now,
        }
    }

    /// The last day changes quickly and is cached briefly
    #[inline]
    pub fn is_short(&self) -> bool {
        matches!(self, TimeRange::Last24Hours)
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.code() == s)
            .ok_or_else(|| AnalyticsError::InvalidTimeRange(s.to_string()))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for TimeRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Closed interval a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_ranges() {
        for code in ["24h", "7d", "30d", "90d", "1y"] {
            assert_eq!(code.parse::<TimeRange>().unwrap().code(), code);
        }
        assert!(matches!(
            "2w".parse::<TimeRange>(),
            Err(AnalyticsError::InvalidTimeRange(_))
        ));
    }

    #[test]
    fn test_display_matches_code() {
        for range in TimeRange::ALL {
            assert_eq!(range.to_string(), range.code());
        }
        assert_eq!(TimeRange::default().to_string(), "30d");
    }

    #[test]
    fn test_window_spans() {
        let now = Utc::now();
        let year = TimeRange::LastYear.window(now);
        assert_eq!(year.end, now);
        assert_eq!(year.end - year.start, Duration::days(365));
        assert_eq!(TimeRange::Last24Hours.span(), Duration::hours(24));
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&TimeRange::Last90Days).unwrap();
        assert_eq!(json, "\"90d\"");
        let back: TimeRange = serde_json::from_str("\"7d\"").unwrap();
        assert_eq!(back, TimeRange::Last7Days);
        assert!(serde_json::from_str::<TimeRange>("\"1w\"").is_err());
    }
}
