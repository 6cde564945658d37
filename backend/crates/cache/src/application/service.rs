//! Cache Service
//!
//! Typed facade over [`CacheRepository`]: values go in and out as any
//! serde type and are stored as JSON.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::application::config::CacheConfig;
use crate::domain::entity::{CacheEntry, validate_key};
use crate::domain::key_pattern::KeyPattern;
use crate::domain::repository::CacheRepository;
use crate::error::{CacheError, CacheResult};

pub struct CacheService<R>
where
    R: CacheRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    config: Arc<CacheConfig>,
}

impl<R> Clone for CacheService<R>
where
    R: CacheRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> CacheService<R>
where
    R: CacheRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<CacheConfig>) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cached value, or `None` when missing or expired
    pub async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.get_value(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Raw JSON value, or `None` when missing or expired
    pub async fn get_value(&self, key: &str) -> CacheResult<Option<serde_json::Value>> {
        validate_key(key)?;

        let entry = self.repo.find(key).await?;
        Ok(entry
            .filter(|e| !e.is_expired(Utc::now()))
            .map(|e| e.data))
    }

    pub async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Internal(format!("Invalid cache TTL: {e}")))?;
        let entry = CacheEntry::new(key, serde_json::to_value(value)?, ttl, Utc::now())?;

        self.repo.upsert(&entry).await?;
        tracing::debug!(key = %key, expires_at = %entry.expires_at, "Cache set");
        Ok(())
    }

    pub async fn set_default<T>(&self, key: &str, value: &T) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.set(key, value, self.config.default_ttl).await
    }

    pub async fn invalidate(&self, key: &str) -> CacheResult<u64> {
        validate_key(key)?;
        self.repo.delete(key).await
    }

    /// Delete all entries whose key matches the regular expression
    pub async fn invalidate_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let pattern = KeyPattern::parse(pattern)?;
        let deleted = self.repo.delete_matching(&pattern).await?;

        tracing::info!(pattern = %pattern, deleted, "Cache invalidated");
        Ok(deleted)
    }

    /// Physically remove expired entries
    pub async fn purge_expired(&self) -> CacheResult<u64> {
        self.repo.delete_expired(Utc::now()).await
    }
}
