//! User Snapshot
//!
//! The slice of a user the token lifecycle needs. Users are owned by the
//! account management side of the platform; auth only reads them and clears
//! elapsed lockouts.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::principal::Role;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub locked_until: Option<DateTime<Utc>>,
}

impl UserSnapshot {
    #[inline]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}
