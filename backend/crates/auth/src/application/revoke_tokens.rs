//! Revoke Refresh Tokens Use Case

use chrono::Utc;
use kernel::id::UserId;
use std::sync::Arc;

use crate::domain::entity::refresh_token::DeviceSession;
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::value_object::{reason::RevocationReason, revoke_scope::RevokeScope};
use crate::error::AuthResult;

pub struct RevokeTokensUseCase<R>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
{
    token_repo: Arc<R>,
}

impl<R> RevokeTokensUseCase<R>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
{
    pub fn new(token_repo: Arc<R>) -> Self {
        Self { token_repo }
    }

    /// Deactivate the user's tokens in `scope`; returns how many were revoked
    pub async fn execute(&self, user_id: &UserId, scope: RevokeScope) -> AuthResult<u64> {
        let now = Utc::now();
        let revoked = match &scope {
            RevokeScope::Token(hash) => {
                self.token_repo
                    .revoke_token(user_id, hash, RevocationReason::Revoked, now)
                    .await?
            }
            RevokeScope::Device(device_id) => {
                self.token_repo
                    .revoke_device(user_id, device_id, RevocationReason::DeviceRevoked, now)
                    .await?
            }
            RevokeScope::All => {
                self.token_repo
                    .revoke_all(user_id, RevocationReason::AllRevoked, now)
                    .await?
            }
        };

        tracing::info!(user_id = %user_id, scope = ?scope, revoked, "Refresh tokens revoked");
        Ok(revoked)
    }

    /// Devices with a usable refresh token, most recently used first
    pub async fn active_devices(&self, user_id: &UserId) -> AuthResult<Vec<DeviceSession>> {
        let now = Utc::now();
        let mut sessions: Vec<DeviceSession> = self
            .token_repo
            .find_active_by_user(user_id)
            .await?
            .iter()
            .filter(|r| r.is_usable(now))
            .map(DeviceSession::from)
            .collect();

        sessions.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(sessions)
    }
}
