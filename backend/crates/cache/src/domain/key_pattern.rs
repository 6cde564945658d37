//! Key Pattern Value Object
//!
//! A regular expression over cache keys. Validated with the `regex` crate
//! before it reaches the store so a bad pattern is a client error, not a
//! database error.

use regex::Regex;
use std::fmt;

use crate::error::{CacheError, CacheResult};

const MAX_PATTERN_LEN: usize = 256;

#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> CacheResult<Self> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidPattern("pattern is empty".to_string()));
        }
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(CacheError::InvalidPattern(format!(
                "pattern longer than {MAX_PATTERN_LEN} bytes"
            )));
        }

        let regex = Regex::new(pattern).map_err(|e| CacheError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern matching exactly the keys that start with `prefix`
    pub fn prefix(prefix: &str) -> CacheResult<Self> {
        Self::parse(&format!("^{}", regex::escape(prefix)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_match() {
        let pattern = KeyPattern::parse("^analytics:batch:").unwrap();
        assert!(pattern.is_match("analytics:batch:42:30d"));
        assert!(!pattern.is_match("analytics:system:30d"));
    }

    #[test]
    fn test_prefix_escapes_metacharacters() {
        let pattern = KeyPattern::prefix("http:/api/v1/analytics?").unwrap();
        assert!(pattern.is_match("http:/api/v1/analytics?range=7d"));
        assert!(!pattern.is_match("http:/api/v1/analytic"));
    }

    #[test]
    fn test_rejects_invalid_patterns() {
        assert!(matches!(KeyPattern::parse("("), Err(CacheError::InvalidPattern(_))));
        assert!(matches!(KeyPattern::parse(""), Err(CacheError::InvalidPattern(_))));
    }
}
