//! Revoke Scope Value Object

use crate::domain::value_object::token_hash::TokenHash;
use crate::error::{AuthError, AuthResult};

/// Which of a user's refresh tokens to revoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeScope {
    /// One specific refresh token
    Token(TokenHash),
    /// Every active token of one device
    Device(String),
    /// Every active token of the user
    All,
}

impl RevokeScope {
    /// Build from the optional request fields; they are mutually exclusive.
    pub fn from_parts(refresh_token: Option<&str>, device_id: Option<&str>) -> AuthResult<Self> {
        let refresh_token = refresh_token.map(str::trim).filter(|t| !t.is_empty());
        let device_id = device_id.map(str::trim).filter(|d| !d.is_empty());

        match (refresh_token, device_id) {
            (Some(_), Some(_)) => Err(AuthError::InvalidRevokeRequest(
                "specify either a refresh token or a device id, not both".to_string(),
            )),
            (Some(token), None) => Ok(RevokeScope::Token(TokenHash::of(token))),
            (None, Some(device)) => Ok(RevokeScope::Device(device.to_string())),
            (None, None) => Ok(RevokeScope::All),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(
            RevokeScope::from_parts(Some("tok"), None).unwrap(),
            RevokeScope::Token(TokenHash::of("tok"))
        );
        assert_eq!(
            RevokeScope::from_parts(None, Some("phone")).unwrap(),
            RevokeScope::Device("phone".to_string())
        );
        assert_eq!(RevokeScope::from_parts(None, None).unwrap(), RevokeScope::All);
        assert_eq!(RevokeScope::from_parts(Some(" "), None).unwrap(), RevokeScope::All);
    }

    #[test]
    fn test_both_fields_is_invalid() {
        assert!(matches!(
            RevokeScope::from_parts(Some("tok"), Some("phone")),
            Err(AuthError::InvalidRevokeRequest(_))
        ));
    }
}
