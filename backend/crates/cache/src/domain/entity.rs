//! Cache Entry Entity

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::error::{CacheError, CacheResult};

const MAX_KEY_LEN: usize = 512;

/// One cached value
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub data: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, data: Value, ttl: Duration, now: DateTime<Utc>) -> CacheResult<Self> {
        let key = key.into();
        validate_key(&key)?;

        Ok(Self {
            key,
            data,
            expires_at: now + ttl,
        })
    }

    /// Expired entries are never returned, even before the sweep removes them.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::InvalidKey(format!(
            "key longer than {MAX_KEY_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", json!(1), Duration::seconds(10), now).unwrap();

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::seconds(9)));
        assert!(entry.is_expired(now + Duration::seconds(10)));
    }

    #[test]
    fn test_rejects_bad_keys() {
        let now = Utc::now();
        assert!(CacheEntry::new("", json!(null), Duration::seconds(1), now).is_err());
        assert!(CacheEntry::new("x".repeat(513), json!(null), Duration::seconds(1), now).is_err());
    }
}
