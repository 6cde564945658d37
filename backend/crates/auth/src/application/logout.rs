//! Logout Use Case
//!
//! Blacklists the presented access token and, when the client also sends
//! its refresh token, revokes that token's record.

use chrono::Utc;
use kernel::id::UserId;
use std::sync::Arc;

use crate::application::blacklist_access::BlacklistAccessUseCase;
use crate::application::config::AuthConfig;
use crate::application::jwt::TokenCodec;
use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository};
use crate::domain::value_object::{
    reason::{BlacklistReason, RevocationReason},
    token_hash::TokenHash,
};
use crate::error::AuthResult;

pub struct LogoutUseCase<R, B>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    B: BlacklistRepository + Send + Sync + 'static,
{
    token_repo: Arc<R>,
    blacklist_repo: Arc<B>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R, B> LogoutUseCase<R, B>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    B: BlacklistRepository + Send + Sync + 'static,
{
    pub fn new(
        token_repo: Arc<R>,
        blacklist_repo: Arc<B>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            token_repo,
            blacklist_repo,
            codec,
            config,
        }
    }

    /// Returns the number of refresh records revoked (0 or 1)
    pub async fn execute(
        &self,
        user_id: &UserId,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> AuthResult<u64> {
        BlacklistAccessUseCase::new(
            self.blacklist_repo.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
        .execute(access_token, BlacklistReason::Logout)
        .await?;

        let revoked = match refresh_token {
            Some(token) => {
                self.token_repo
                    .revoke_token(
                        user_id,
                        &TokenHash::of(token),
                        RevocationReason::Logout,
                        Utc::now(),
                    )
                    .await?
            }
            None => 0,
        };

        tracing::info!(user_id = %user_id, refresh_revoked = revoked, "User logged out");
        Ok(revoked)
    }
}
