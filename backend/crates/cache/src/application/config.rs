//! Cache Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL used when a caller does not pass one
    pub default_ttl: Duration,
    /// TTL of cached HTTP responses
    pub response_ttl: Duration,
    /// Largest response body the HTTP cache will buffer
    pub max_response_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            response_ttl: Duration::from_secs(300),
            max_response_bytes: 1024 * 1024,
        }
    }
}

impl CacheConfig {
    /// Short TTLs so stale data is easy to spot while developing
    pub fn development() -> Self {
        Self {
            default_ttl: Duration::from_secs(60),
            response_ttl: Duration::from_secs(30),
            ..Self::default()
        }
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl.as_secs()
    }
}
