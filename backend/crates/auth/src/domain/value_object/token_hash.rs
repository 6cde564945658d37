//! Token Hash Value Object
//!
//! Raw tokens are never persisted; refresh records and blacklist entries are
//! keyed by the lowercase hex SHA-256 of the token string.

use platform::crypto::sha256_hex;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    /// Hash a raw token
    pub fn of(raw_token: &str) -> Self {
        Self(sha256_hex(raw_token.as_bytes()))
    }

    /// Wrap a hash read back from storage
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenHash {
    /// Only a prefix; full hashes do not belong in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", &self.0[..self.0.len().min(12)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let a = TokenHash::of("eyJhbGciOiJIUzI1NiJ9.payload.sig");
        let b = TokenHash::of("eyJhbGciOiJIUzI1NiJ9.payload.sig");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, TokenHash::of("other"));
    }

    #[test]
    fn test_display_is_truncated() {
        let hash = TokenHash::of("x");
        assert_eq!(hash.to_string().chars().count(), 13);
    }
}
