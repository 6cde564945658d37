//! Authenticated caller
//!
//! The auth middleware verifies the bearer token and stores a [`Principal`]
//! in the request extensions; other contexts only read it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::app_error::AppError;
use crate::id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Instructors and admins may look at other students' data.
    #[inline]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::validation(format!("Unknown role: {other}"))),
        }
    }
}

/// Caller identity extracted from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
}

impl Principal {
    /// Fails with an authorization error unless the caller has one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient role for this operation"))
        }
    }

    /// Students may only act on themselves; staff may act on anyone.
    pub fn require_self_or_staff(&self, subject: &UserId) -> Result<(), AppError> {
        if self.role.is_staff() || &self.user_id == subject {
            Ok(())
        } else {
            Err(AppError::forbidden("Cannot access another user's data"))
        }
    }
}
