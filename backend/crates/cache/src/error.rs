//! Cache Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Key pattern is not a valid regular expression
    #[error("Invalid cache key pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Cache TTL must be positive")]
    InvalidTtl,

    /// Value could not be (de)serialized
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidPattern(_) | CacheError::InvalidKey(_) | CacheError::InvalidTtl => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Serialization(_) | CacheError::Database(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::InvalidPattern(_) | CacheError::InvalidKey(_) | CacheError::InvalidTtl => {
                ErrorKind::BadRequest
            }
            CacheError::Serialization(_) | CacheError::Database(_) | CacheError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            CacheError::Database(e) => tracing::error!(error = %e, "Cache database error"),
            CacheError::Serialization(e) => {
                tracing::error!(error = %e, "Cache serialization error")
            }
            CacheError::Internal(msg) => tracing::error!(message = %msg, "Cache internal error"),
            _ => tracing::debug!(error = %self, "Cache error"),
        }
    }
}

impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        err.log();
        err.to_app_error()
    }
}
