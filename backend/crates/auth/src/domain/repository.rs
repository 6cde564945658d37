//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{RefreshTokenId, UserId};

use crate::domain::entity::{
    blacklist_entry::BlacklistEntry, refresh_token::RefreshTokenRecord, user::UserSnapshot,
};
use crate::domain::value_object::{reason::RevocationReason, token_hash::TokenHash};
use crate::error::AuthResult;

/// Refresh token record repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> AuthResult<()>;

    /// Find a record by token hash, active or not
    async fn find_by_hash(&self, token_hash: &TokenHash) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Active records of a user, least recently used first
    async fn find_active_by_user(&self, user_id: &UserId) -> AuthResult<Vec<RefreshTokenRecord>>;

    /// Deactivate only if still active; `false` when another caller got there first
    async fn deactivate_if_active(
        &self,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Deactivate one token of a user
    async fn revoke_token(
        &self,
        user_id: &UserId,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64>;

    /// Deactivate every active token of a user's device
    async fn revoke_device(
        &self,
        user_id: &UserId,
        device_id: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64>;

    /// Deactivate every active token of a user
    async fn revoke_all(
        &self,
        user_id: &UserId,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64>;

    async fn delete(&self, id: &RefreshTokenId) -> AuthResult<()>;

    /// Delete records with `expires_at <= now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Access token blacklist repository trait
#[trait_variant::make(BlacklistRepository: Send)]
pub trait LocalBlacklistRepository {
    /// Insert, or replace an existing entry for the same hash
    async fn upsert(&self, entry: &BlacklistEntry) -> AuthResult<()>;

    async fn find(&self, token_hash: &TokenHash) -> AuthResult<Option<BlacklistEntry>>;

    /// Delete entries with `expires_at <= now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// User repository trait (read side plus lockout maintenance)
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<UserSnapshot>>;

    /// Clear `locked_until` where it has passed; returns the number of users unlocked
    async fn reset_elapsed_lockouts(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
