//! Issue Token Pair Use Case
//!
//! Signs an access/refresh pair for a user on a device and records the
//! refresh token. Users keep at most `max_devices_per_user` active refresh
//! tokens; the least recently used ones are deleted to make room.

use chrono::{DateTime, Utc};
use platform::client::DeviceInfo;
use serde::Serialize;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::jwt::TokenCodec;
use crate::domain::entity::{refresh_token::RefreshTokenRecord, user::UserSnapshot};
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::value_object::claims::{AccessClaims, RefreshClaims};
use crate::domain::value_object::token_hash::TokenHash;
use crate::error::AuthResult;

/// Freshly issued credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub device_id: String,
}

pub struct IssueTokenPairUseCase<R>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
{
    token_repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> IssueTokenPairUseCase<R>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
{
    pub fn new(token_repo: Arc<R>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            token_repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, user: &UserSnapshot, device: DeviceInfo) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access_expires_at = now + self.config.access_ttl()?;
        let refresh_expires_at = now + self.config.refresh_ttl()?;

        let access_token = self.codec.sign_access(&AccessClaims::new(
            user.user_id,
            user.role,
            user.email.clone(),
            now,
            access_expires_at,
        ))?;
        let refresh_token = self.codec.sign_refresh(&RefreshClaims::new(
            user.user_id,
            device.device_id.clone(),
            now,
            refresh_expires_at,
        ))?;

        self.evict_least_recently_used(user).await?;

        let device_id = device.device_id.clone();
        let record = RefreshTokenRecord::issue(
            user.user_id,
            TokenHash::of(&refresh_token),
            device,
            self.config.refresh_ttl()?,
            now,
        );
        self.token_repo.insert(&record).await?;

        tracing::info!(
            user_id = %user.user_id,
            device_id = %device_id,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            access_expires_at,
            refresh_expires_at,
            device_id,
        })
    }

    /// Delete the oldest active records so one more fits under the limit
    async fn evict_least_recently_used(&self, user: &UserSnapshot) -> AuthResult<()> {
        let active = self.token_repo.find_active_by_user(&user.user_id).await?;
        let limit = self.config.max_devices_per_user.max(1);
        if active.len() < limit {
            return Ok(());
        }

        let excess = active.len() + 1 - limit;
        for record in active.iter().take(excess) {
            self.token_repo.delete(&record.id).await?;
            tracing::info!(
                user_id = %user.user_id,
                device_id = %record.device.device_id,
                last_used_at = %record.last_used_at,
                "Evicted least recently used refresh token"
            );
        }
        Ok(())
    }
}
