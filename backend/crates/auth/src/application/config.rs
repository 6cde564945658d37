//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret for access tokens
    pub access_secret: Vec<u8>,
    /// HS256 secret for refresh tokens (must differ from the access secret)
    pub refresh_secret: Vec<u8>,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Active refresh tokens kept per user before the least recently used is evicted
    pub max_devices_per_user: usize,
    /// Blacklist lifetime when the token's own `exp` cannot be read
    pub blacklist_fallback_ttl: Duration,
    /// Interval of the scheduled cleanup job
    pub cleanup_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: vec![0u8; 32],
            refresh_secret: vec![1u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            max_devices_per_user: 5,
            blacklist_fallback_ttl: Duration::from_secs(15 * 60),
            cleanup_interval: Duration::from_secs(3600),
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (for development)
    pub fn with_random_secret() -> Self {
        Self {
            access_secret: platform::crypto::random_secret().to_vec(),
            refresh_secret: platform::crypto::random_secret().to_vec(),
            ..Default::default()
        }
    }

    /// Create config for development (random secrets, frequent cleanup)
    pub fn development() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60),
            ..Self::with_random_secret()
        }
    }

    pub fn access_ttl(&self) -> AuthResult<chrono::Duration> {
        to_chrono(self.access_token_ttl, "access token TTL")
    }

    pub fn refresh_ttl(&self) -> AuthResult<chrono::Duration> {
        to_chrono(self.refresh_token_ttl, "refresh token TTL")
    }

    pub fn blacklist_fallback(&self) -> AuthResult<chrono::Duration> {
        to_chrono(self.blacklist_fallback_ttl, "blacklist fallback TTL")
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }
}

fn to_chrono(duration: Duration, what: &str) -> AuthResult<chrono::Duration> {
    chrono::Duration::from_std(duration)
        .map_err(|e| AuthError::Internal(format!("Invalid {what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_ttl_secs(), 900);
        assert_eq!(config.refresh_ttl().unwrap(), chrono::Duration::days(7));
        assert_eq!(config.max_devices_per_user, 5);
        assert_eq!(config.blacklist_fallback_ttl, config.access_token_ttl);
        assert_ne!(config.access_secret, config.refresh_secret);
    }

    #[test]
    fn test_random_secrets_differ() {
        let config = AuthConfig::with_random_secret();
        assert_ne!(config.access_secret, config.refresh_secret);
        assert_ne!(config.access_secret, AuthConfig::with_random_secret().access_secret);
    }
}
