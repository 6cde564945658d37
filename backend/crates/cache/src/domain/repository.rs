//! Repository Traits

use chrono::{DateTime, Utc};

use crate::domain::entity::CacheEntry;
use crate::domain::key_pattern::KeyPattern;
use crate::error::CacheResult;

/// Cache entry persistence
#[trait_variant::make(CacheRepository: Send)]
pub trait LocalCacheRepository {
    /// Entry by key, expired or not
    async fn find(&self, key: &str) -> CacheResult<Option<CacheEntry>>;

    /// Insert or replace by key
    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Delete every entry whose key matches
    async fn delete_matching(&self, pattern: &KeyPattern) -> CacheResult<u64>;

    /// Physically remove entries with `expires_at <= now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64>;
}
