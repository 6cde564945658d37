//! In-memory Cache Repository
//!
//! Same semantics as the PostgreSQL repository; used by tests and local runs
//! without a database.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entity::CacheEntry;
use crate::domain::key_pattern::KeyPattern;
use crate::domain::repository::CacheRepository;
use crate::error::CacheResult;

#[derive(Clone, Default)]
pub struct InMemoryCacheRepository {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCacheRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl CacheRepository for InMemoryCacheRepository {
    async fn find(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        Ok(self.entries.write().await.remove(key).map_or(0, |_| 1))
    }

    async fn delete_matching(&self, pattern: &KeyPattern) -> CacheResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !pattern.is_match(key));
        Ok((before - entries.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}
