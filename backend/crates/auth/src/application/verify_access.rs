//! Verify Access Use Case
//!
//! Signature and expiry checks are local; the blacklist lookup is a separate
//! call so callers that only need the claims skip the store round-trip.

use chrono::Utc;
use std::sync::Arc;

use crate::application::jwt::TokenCodec;
use crate::domain::repository::BlacklistRepository;
use crate::domain::value_object::claims::AccessClaims;
use crate::domain::value_object::token_hash::TokenHash;
use crate::error::{AuthError, AuthResult};

pub struct VerifyAccessUseCase<B>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    blacklist_repo: Arc<B>,
    codec: Arc<TokenCodec>,
}

impl<B> VerifyAccessUseCase<B>
where
    B: BlacklistRepository + Send + Sync + 'static,
{
    pub fn new(blacklist_repo: Arc<B>, codec: Arc<TokenCodec>) -> Self {
        Self {
            blacklist_repo,
            codec,
        }
    }

    /// Fails with `TokenExpired` or `TokenInvalid`
    pub fn verify(&self, token: &str) -> AuthResult<AccessClaims> {
        self.codec.verify_access(token)
    }

    /// `true` while a blacklist entry for this token is unexpired
    pub async fn is_blacklisted(&self, token: &str) -> AuthResult<bool> {
        let entry = self.blacklist_repo.find(&TokenHash::of(token)).await?;
        Ok(entry.is_some_and(|e| e.is_active_at(Utc::now())))
    }

    /// Verify, then reject blacklisted tokens
    pub async fn authenticate(&self, token: &str) -> AuthResult<AccessClaims> {
        let claims = self.verify(token)?;
        if self.is_blacklisted(token).await? {
            return Err(AuthError::TokenBlacklisted);
        }
        Ok(claims)
    }
}
