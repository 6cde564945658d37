//! PostgreSQL Cache Repository

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::domain::entity::CacheEntry;
use crate::domain::key_pattern::KeyPattern;
use crate::domain::repository::CacheRepository;
use crate::error::CacheResult;

#[derive(Clone)]
pub struct PgCacheRepository {
    pool: PgPool,
}

impl PgCacheRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CacheRepository for PgCacheRepository {
    async fn find(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let row = sqlx::query_as::<_, CacheEntryRow>(
            r#"
            SELECT cache_key, data, expires_at
            FROM cache_entries
            WHERE cache_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CacheEntryRow::into_entry))
    }

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (cache_key, data, expires_at, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (cache_key) DO UPDATE SET
                data = EXCLUDED.data,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
            "#,
        )
        .bind(&entry.key)
        .bind(&entry.data)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let deleted = sqlx::query("DELETE FROM cache_entries WHERE cache_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_matching(&self, pattern: &KeyPattern) -> CacheResult<u64> {
        let deleted = sqlx::query("DELETE FROM cache_entries WHERE cache_key ~ $1")
            .bind(pattern.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64> {
        let deleted = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(entries_deleted = deleted, "Purged expired cache entries");

        Ok(deleted)
    }
}

#[derive(sqlx::FromRow)]
struct CacheEntryRow {
    cache_key: String,
    data: Value,
    expires_at: DateTime<Utc>,
}

impl CacheEntryRow {
    fn into_entry(self) -> CacheEntry {
        CacheEntry {
            key: self.cache_key,
            data: self.data,
            expires_at: self.expires_at,
        }
    }
}
