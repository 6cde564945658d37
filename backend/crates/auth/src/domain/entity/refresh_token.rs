//! Refresh Token Record Entity
//!
//! One row per issued refresh token. A user holds a bounded number of active
//! records (one per device in practice); rotation deactivates the old record
//! and inserts a new one for the same device.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{RefreshTokenId, UserId};
use platform::client::DeviceInfo;
use serde::Serialize;

use crate::domain::value_object::{reason::RevocationReason, token_hash::TokenHash};

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: TokenHash,
    pub device: DeviceInfo,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub is_active: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<RevocationReason>,
}

impl RefreshTokenRecord {
    /// Record for a freshly issued token
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn issue(
        user_id: UserId,
        token_hash: TokenHash,
        device: DeviceInfo,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RefreshTokenId::new(),
            user_id,
            token_hash,
            device,
            created_at: now,
            expires_at: now + ttl,
            last_used_at: now,
            is_active: true,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Active and not yet expired
    #[inline]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    pub fn revoke(&mut self, reason: RevocationReason, now: DateTime<Utc>) {
        if self.is_active {
            self.is_active = false;
            self.revoked_at = Some(now);
            self.revoked_reason = Some(reason);
        }
    }
}

/// Device session for account-management display (no token material)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSession {
    pub device_id: String,
    pub device_name: String,
    pub browser: String,
    pub os: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&RefreshTokenRecord> for DeviceSession {
    fn from(record: &RefreshTokenRecord) -> Self {
        Self {
            device_id: record.device.device_id.clone(),
            device_name: record.device.device_name.clone(),
            browser: record.device.browser.clone(),
            os: record.device.os.clone(),
            ip_address: record.device.ip_address.clone(),
            created_at: record.created_at,
            last_used_at: record.last_used_at,
            expires_at: record.expires_at,
        }
    }
}
