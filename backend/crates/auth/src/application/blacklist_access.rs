//! Blacklist Access Token Use Case

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::jwt::TokenCodec;
use crate::domain::entity::blacklist_entry::BlacklistEntry;
use crate::domain::repository::BlacklistRepository;
use crate::domain::value_object::{reason::BlacklistReason, token_hash::TokenHash};
use crate::error::AuthResult;

pub struct BlacklistAccessUseCase<B>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    blacklist_repo: Arc<B>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<B> BlacklistAccessUseCase<B>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    pub fn new(blacklist_repo: Arc<B>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            blacklist_repo,
            codec,
            config,
        }
    }

    /// Blacklist until the token's own expiry, or for the fallback TTL when
    /// the token cannot be decoded. Returns the entry's expiry.
    pub async fn execute(&self, token: &str, reason: BlacklistReason) -> AuthResult<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = match self
            .codec
            .decode_access_ignoring_expiry(token)
            .ok()
            .and_then(|claims| claims.expires_at())
        {
            Some(exp) => exp,
            None => now + self.config.blacklist_fallback()?,
        };

        let token_hash = TokenHash::of(token);
        let entry = BlacklistEntry::new(token_hash.clone(), reason, expires_at, now);
        self.blacklist_repo.upsert(&entry).await?;

        tracing::info!(
            token = %token_hash,
            reason = %reason,
            expires_at = %expires_at,
            "Access token blacklisted"
        );
        Ok(expires_at)
    }
}
