//! Rotate Refresh Token Use Case
//!
//! Exchanges a refresh token for a new pair on the same device. The old
//! record is deactivated with a conditional update, so when two requests
//! race with the same token exactly one wins and the other gets
//! `RefreshTokenNotFound`.

use chrono::Utc;
use platform::client::DeviceInfo;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::issue_tokens::{IssueTokenPairUseCase, TokenPair};
use crate::application::jwt::TokenCodec;
use crate::domain::entity::user::UserSnapshot;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{reason::RevocationReason, token_hash::TokenHash};
use crate::error::{AuthError, AuthResult};

/// New credentials plus the user they were issued for
#[derive(Debug, Clone)]
pub struct RotatedTokens {
    pub tokens: TokenPair,
    pub user: UserSnapshot,
}

pub struct RotateRefreshUseCase<R, U>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    token_repo: Arc<R>,
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R, U> RotateRefreshUseCase<R, U>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        token_repo: Arc<R>,
        user_repo: Arc<U>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            token_repo,
            user_repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: &str, device: DeviceInfo) -> AuthResult<RotatedTokens> {
        // Expiry is judged from the record so an expired record can be pruned
        let claims = self.codec.decode_refresh_ignoring_expiry(refresh_token)?;
        let token_hash = TokenHash::of(refresh_token);

        let record = self
            .token_repo
            .find_by_hash(&token_hash)
            .await?
            .filter(|r| r.is_active && r.user_id == claims.sub)
            .ok_or(AuthError::RefreshTokenNotFound)?;

        let now = Utc::now();
        if record.is_expired(now) {
            self.token_repo.delete(&record.id).await?;
            return Err(AuthError::RefreshTokenExpired);
        }

        let user = self
            .user_repo
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }
        if user.is_locked_at(now) {
            return Err(AuthError::AccountLocked);
        }

        let won = self
            .token_repo
            .deactivate_if_active(&token_hash, RevocationReason::Rotated, now)
            .await?;
        if !won {
            tracing::warn!(
                user_id = %record.user_id,
                device_id = %record.device.device_id,
                "Concurrent refresh token rotation lost"
            );
            return Err(AuthError::RefreshTokenNotFound);
        }

        let device = record.device.refreshed_from(&device);
        let tokens = IssueTokenPairUseCase::new(
            self.token_repo.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
        .execute(&user, device)
        .await?;

        Ok(RotatedTokens { tokens, user })
    }
}
