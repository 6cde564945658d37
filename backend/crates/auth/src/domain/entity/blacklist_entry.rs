//! Blacklist Entry Entity
//!
//! An access token revoked before its natural expiry. The entry lives only
//! as long as the token would have; after that the token is rejected on
//! expiry alone.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{reason::BlacklistReason, token_hash::TokenHash};

#[derive(Debug, Clone)]
pub struct BlacklistEntry {
    pub token_hash: TokenHash,
    pub reason: BlacklistReason,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(
        token_hash: TokenHash,
        reason: BlacklistReason,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            token_hash,
            reason,
            expires_at,
            created_at: now,
        }
    }

    #[inline]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
