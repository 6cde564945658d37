//! Cleanup Expired Use Case
//!
//! Scheduled maintenance: prunes expired refresh records and blacklist
//! entries, lifts elapsed account lockouts and sweeps expired cache rows.
//! Every step is idempotent; a failing step is logged and the rest still run.

use cache::CacheRepository;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub refresh_tokens_deleted: u64,
    pub blacklist_entries_deleted: u64,
    pub lockouts_reset: u64,
    pub cache_entries_purged: u64,
    pub failed_steps: Vec<&'static str>,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

pub struct CleanupExpiredUseCase<R, B, U, C>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    B: BlacklistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    token_repo: Arc<R>,
    blacklist_repo: Arc<B>,
    user_repo: Arc<U>,
    cache_repo: Arc<C>,
}

impl<R, B, U, C> CleanupExpiredUseCase<R, B, U, C>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    B: BlacklistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    pub fn new(
        token_repo: Arc<R>,
        blacklist_repo: Arc<B>,
        user_repo: Arc<U>,
        cache_repo: Arc<C>,
    ) -> Self {
        Self {
            token_repo,
            blacklist_repo,
            user_repo,
            cache_repo,
        }
    }

    pub async fn execute(&self) -> CleanupReport {
        let now = Utc::now();
        let mut report = CleanupReport::default();

        match self.token_repo.delete_expired(now).await {
            Ok(n) => report.refresh_tokens_deleted = n,
            Err(e) => {
                tracing::warn!(error = %e, "Refresh token cleanup failed");
                report.failed_steps.push("refresh_tokens");
            }
        }

        match self.blacklist_repo.delete_expired(now).await {
            Ok(n) => report.blacklist_entries_deleted = n,
            Err(e) => {
                tracing::warn!(error = %e, "Blacklist cleanup failed");
                report.failed_steps.push("blacklist");
            }
        }

        match self.user_repo.reset_elapsed_lockouts(now).await {
            Ok(n) => report.lockouts_reset = n,
            Err(e) => {
                tracing::warn!(error = %e, "Lockout reset failed");
                report.failed_steps.push("lockouts");
            }
        }

        match self.cache_repo.delete_expired(now).await {
            Ok(n) => report.cache_entries_purged = n,
            Err(e) => {
                tracing::warn!(error = %e, "Cache purge failed");
                report.failed_steps.push("cache");
            }
        }

        tracing::info!(
            refresh_tokens_deleted = report.refresh_tokens_deleted,
            blacklist_entries_deleted = report.blacklist_entries_deleted,
            lockouts_reset = report.lockouts_reset,
            cache_entries_purged = report.cache_entries_purged,
            failed_steps = report.failed_steps.len(),
            "Token cleanup completed"
        );

        report
    }
}

/// Run cleanup every `interval` on the runtime. The first run happens one
/// interval after spawning; overrunning ticks are skipped, not queued.
pub fn spawn_cleanup_job<R, B, U, C>(
    use_case: Arc<CleanupExpiredUseCase<R, B, U, C>>,
    interval: Duration,
) -> JoinHandle<()>
where
    R: RefreshTokenRepository + Send + Sync + 'static,
    B: BlacklistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CacheRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately
        ticker.tick().await;

        tracing::info!(interval_secs = interval.as_secs(), "Cleanup job started");
        loop {
            ticker.tick().await;
            use_case.execute().await;
        }
    })
}
