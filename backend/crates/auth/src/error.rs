//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing `Authorization: Bearer` header
    #[error("Authentication required")]
    MissingToken,

    /// Signature valid but past `exp`
    #[error("Token has expired")]
    TokenExpired,

    /// Malformed, wrongly signed, or wrong token type
    #[error("Invalid token")]
    TokenInvalid,

    /// Access token revoked before expiry
    #[error("Token has been revoked")]
    TokenBlacklisted,

    /// No active record for this refresh token (unknown, revoked, or already rotated)
    #[error("Refresh token not found or revoked")]
    RefreshTokenNotFound,

    /// Record found but past its expiry
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Invalid revoke request: {0}")]
    InvalidRevokeRequest(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenBlacklisted
            | AuthError::RefreshTokenNotFound
            | AuthError::RefreshTokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::AccountDisabled | AuthError::AccountLocked | AuthError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::InvalidRevokeRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenBlacklisted
            | AuthError::RefreshTokenNotFound
            | AuthError::RefreshTokenExpired => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::AccountDisabled | AuthError::AccountLocked | AuthError::Forbidden(_) => {
                ErrorKind::Forbidden
            }
            AuthError::InvalidRevokeRequest(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::TokenExpired => err.with_action("Refresh the access token"),
            AuthError::RefreshTokenNotFound | AuthError::RefreshTokenExpired => {
                err.with_action("Sign in again")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TokenBlacklisted => {
                tracing::warn!("Blacklisted access token presented");
            }
            AuthError::RefreshTokenNotFound => {
                tracing::warn!("Unknown or reused refresh token presented");
            }
            AuthError::AccountDisabled | AuthError::AccountLocked => {
                tracing::warn!(error = %self, "Token use on restricted account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        err.to_app_error()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => AuthError::Forbidden(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<cache::CacheError> for AuthError {
    fn from(err: cache::CacheError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
        match err.kind() {
            JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}
