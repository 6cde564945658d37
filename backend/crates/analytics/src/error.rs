//! Analytics Error Types
//!
//! Analytics-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cache::CacheError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Analytics-specific result type alias
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid time range: {0} (expected 24h, 7d, 30d, 90d or 1y)")]
    InvalidTimeRange(String),

    #[error("Invalid cache pattern: {0}")]
    InvalidPattern(String),

    #[error("Batch not found")]
    BatchNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cache error: {0}")]
    Cache(CacheError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::InvalidTimeRange(_) | AnalyticsError::InvalidPattern(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalyticsError::BatchNotFound | AnalyticsError::CourseNotFound => StatusCode::NOT_FOUND,
            AnalyticsError::Forbidden(_) => StatusCode::FORBIDDEN,
            AnalyticsError::Cache(_) | AnalyticsError::Database(_) | AnalyticsError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyticsError::InvalidTimeRange(_) | AnalyticsError::InvalidPattern(_) => {
                ErrorKind::BadRequest
            }
            AnalyticsError::BatchNotFound | AnalyticsError::CourseNotFound => ErrorKind::NotFound,
            AnalyticsError::Forbidden(_) => ErrorKind::Forbidden,
            AnalyticsError::Cache(_) | AnalyticsError::Database(_) | AnalyticsError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            AnalyticsError::Database(e) => {
                tracing::error!(error = %e, "Analytics database error");
            }
            AnalyticsError::Cache(e) => {
                tracing::error!(error = %e, "Analytics cache error");
            }
            AnalyticsError::Internal(msg) => {
                tracing::error!(message = %msg, "Analytics internal error");
            }
            AnalyticsError::Forbidden(msg) => {
                tracing::warn!(message = %msg, "Analytics access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Analytics error");
            }
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        err.log();
        err.to_app_error()
    }
}

impl From<AppError> for AnalyticsError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => AnalyticsError::Forbidden(err.message().to_string()),
            _ => AnalyticsError::Internal(err.to_string()),
        }
    }
}

impl From<CacheError> for AnalyticsError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidPattern(msg) => AnalyticsError::InvalidPattern(msg),
            other => AnalyticsError::Cache(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert_eq!(
            AnalyticsError::InvalidTimeRange("2w".into()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(AnalyticsError::CourseNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_cache_pattern_is_a_validation_error() {
        let err: AnalyticsError = CacheError::InvalidPattern("(".into()).into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
