//! Revocation and blacklist reasons

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuthError;

/// Why a refresh token record stopped being active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    /// Exchanged for a new pair
    #[display("rotated")]
    Rotated,
    #[display("logout")]
    Logout,
    /// Single token revoked by its owner
    #[display("revoked")]
    Revoked,
    #[display("device_revoked")]
    DeviceRevoked,
    #[display("all_revoked")]
    AllRevoked,
}

impl RevocationReason {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::Revoked => "revoked",
            RevocationReason::DeviceRevoked => "device_revoked",
            RevocationReason::AllRevoked => "all_revoked",
        }
    }
}

impl FromStr for RevocationReason {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotated" => Ok(RevocationReason::Rotated),
            "logout" => Ok(RevocationReason::Logout),
            "revoked" => Ok(RevocationReason::Revoked),
            "device_revoked" => Ok(RevocationReason::DeviceRevoked),
            "all_revoked" => Ok(RevocationReason::AllRevoked),
            other => Err(AuthError::Internal(format!(
                "Unknown revocation reason in storage: {other}"
            ))),
        }
    }
}

/// Why an access token was blacklisted before its natural expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistReason {
    #[display("logout")]
    Logout,
    #[display("password_change")]
    PasswordChange,
    #[display("security")]
    Security,
    #[display("admin")]
    Admin,
}

impl BlacklistReason {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            BlacklistReason::Logout => "logout",
            BlacklistReason::PasswordChange => "password_change",
            BlacklistReason::Security => "security",
            BlacklistReason::Admin => "admin",
        }
    }
}

impl FromStr for BlacklistReason {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logout" => Ok(BlacklistReason::Logout),
            "password_change" => Ok(BlacklistReason::PasswordChange),
            "security" => Ok(BlacklistReason::Security),
            "admin" => Ok(BlacklistReason::Admin),
            other => Err(AuthError::Internal(format!(
                "Unknown blacklist reason in storage: {other}"
            ))),
        }
    }
}
