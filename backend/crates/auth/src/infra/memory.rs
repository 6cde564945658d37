//! In-memory Repository Implementations
//!
//! Mirrors the PostgreSQL repository's semantics, including the conditional
//! deactivation used by refresh rotation. For tests and database-less runs.

use chrono::{DateTime, Utc};
use kernel::id::{RefreshTokenId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entity::{
    blacklist_entry::BlacklistEntry, refresh_token::RefreshTokenRecord, user::UserSnapshot,
};
use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{reason::RevocationReason, token_hash::TokenHash};
use crate::error::AuthResult;

#[derive(Default)]
struct State {
    refresh_tokens: HashMap<TokenHash, RefreshTokenRecord>,
    blacklist: HashMap<TokenHash, BlacklistEntry>,
    users: HashMap<UserId, UserSnapshot>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub async fn put_user(&self, user: UserSnapshot) {
        self.state.write().await.users.insert(user.user_id, user);
    }

    /// Every refresh record of a user, active or not
    pub async fn records_for(&self, user_id: &UserId) -> Vec<RefreshTokenRecord> {
        self.state
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn deactivate_where<F>(
        &self,
        reason: RevocationReason,
        now: DateTime<Utc>,
        pred: F,
    ) -> u64
    where
        F: Fn(&RefreshTokenRecord) -> bool,
    {
        let mut state = self.state.write().await;
        let mut revoked = 0;
        for record in state.refresh_tokens.values_mut() {
            if record.is_active && pred(record) {
                record.revoke(reason, now);
                revoked += 1;
            }
        }
        revoked
    }
}

impl RefreshTokenRepository for InMemoryAuthRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        self.state
            .write()
            .await
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &TokenHash) -> AuthResult<Option<RefreshTokenRecord>> {
        Ok(self.state.read().await.refresh_tokens.get(token_hash).cloned())
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> AuthResult<Vec<RefreshTokenRecord>> {
        let mut records: Vec<RefreshTokenRecord> = self
            .state
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|r| &r.user_id == user_id && r.is_active)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.last_used_at);
        Ok(records)
    }

    async fn deactivate_if_active(
        &self,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state.refresh_tokens.get_mut(token_hash) {
            Some(record) if record.is_active => {
                record.revoke(reason, now);
                record.last_used_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_token(
        &self,
        user_id: &UserId,
        token_hash: &TokenHash,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        Ok(self
            .deactivate_where(reason, now, |r| {
                &r.user_id == user_id && &r.token_hash == token_hash
            })
            .await)
    }

    async fn revoke_device(
        &self,
        user_id: &UserId,
        device_id: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        Ok(self
            .deactivate_where(reason, now, |r| {
                &r.user_id == user_id && r.device.device_id == device_id
            })
            .await)
    }

    async fn revoke_all(
        &self,
        user_id: &UserId,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> AuthResult<u64> {
        Ok(self
            .deactivate_where(reason, now, |r| &r.user_id == user_id)
            .await)
    }

    async fn delete(&self, id: &RefreshTokenId) -> AuthResult<()> {
        self.state
            .write()
            .await
            .refresh_tokens
            .retain(|_, r| &r.id != id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, r| !r.is_expired(now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

impl BlacklistRepository for InMemoryAuthRepository {
    async fn upsert(&self, entry: &BlacklistEntry) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let expires_at = state
            .blacklist
            .get(&entry.token_hash)
            .map_or(entry.expires_at, |existing| existing.expires_at.max(entry.expires_at));

        state.blacklist.insert(
            entry.token_hash.clone(),
            BlacklistEntry {
                expires_at,
                ..entry.clone()
            },
        );
        Ok(())
    }

    async fn find(&self, token_hash: &TokenHash) -> AuthResult<Option<BlacklistEntry>> {
        Ok(self.state.read().await.blacklist.get(token_hash).cloned())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.blacklist.len();
        state.blacklist.retain(|_, e| e.is_active_at(now));
        Ok((before - state.blacklist.len()) as u64)
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<UserSnapshot>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn reset_elapsed_lockouts(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let mut reset = 0;
        for user in state.users.values_mut() {
            if user.locked_until.is_some_and(|until| until <= now) {
                user.locked_until = None;
                reset += 1;
            }
        }
        Ok(reset)
    }
}
