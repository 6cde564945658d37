//! Learning Streak
//!
//! Consecutive UTC calendar days with activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a recalculation counts as the student's own activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// The student triggered it: advance the streak and `last_active`
    Touch,
    /// Someone else is looking: leave the streak alone
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub last_active: Option<DateTime<Utc>>,
}

impl Streak {
    /// Record activity at `now`
    ///
    /// Same day keeps the count, the next day extends it, a longer gap
    /// restarts it at 1.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.current = match self.last_active {
            None => 1,
            Some(last) => {
                let gap = (now.date_naive() - last.date_naive()).num_days();
                match gap {
                    i64::MIN..=0 => self.current.max(1),
                    1 => self.current + 1,
                    _ => 1,
                }
            }
        };
        self.longest = self.longest.max(self.current);
        self.last_active = Some(now);
    }
}
