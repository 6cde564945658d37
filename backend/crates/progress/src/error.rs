//! Progress Error Types
//!
//! Progress-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Progress-specific result type alias
pub type ProgressResult<T> = Result<T, ProgressError>;

#[derive(Debug, Error)]
pub enum ProgressError {
    /// No active enrollment for the (student, batch) pair
    #[error("Student is not enrolled in this batch")]
    NotEnrolled,

    /// A second active enrollment for the same pair
    #[error("Student is already enrolled in this batch")]
    AlreadyEnrolled,

    #[error("Batch not found")]
    BatchNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Role or ownership mismatch
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProgressError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProgressError::NotEnrolled | ProgressError::BatchNotFound => StatusCode::NOT_FOUND,
            ProgressError::AlreadyEnrolled => StatusCode::CONFLICT,
            ProgressError::Validation(_) => StatusCode::BAD_REQUEST,
            ProgressError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProgressError::Database(_)
            | ProgressError::Serialization(_)
            | ProgressError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProgressError::NotEnrolled | ProgressError::BatchNotFound => ErrorKind::NotFound,
            ProgressError::AlreadyEnrolled => ErrorKind::Conflict,
            ProgressError::Validation(_) => ErrorKind::BadRequest,
            ProgressError::Forbidden(_) => ErrorKind::Forbidden,
            ProgressError::Database(_)
            | ProgressError::Serialization(_)
            | ProgressError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            ProgressError::NotEnrolled => err.with_action("Enroll the student in the batch first"),
            _ => err,
        }
    }

    fn log(&self) {
        match self {
            ProgressError::Database(e) => {
                tracing::error!(error = %e, "Progress database error");
            }
            ProgressError::Serialization(e) => {
                tracing::error!(error = %e, "Progress record serialization error");
            }
            ProgressError::Internal(msg) => {
                tracing::error!(message = %msg, "Progress internal error");
            }
            ProgressError::Forbidden(msg) => {
                tracing::warn!(message = %msg, "Progress access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Progress error");
            }
        }
    }
}

impl IntoResponse for ProgressError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        err.log();
        err.to_app_error()
    }
}

impl From<AppError> for ProgressError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Forbidden => ProgressError::Forbidden(err.message().to_string()),
            ErrorKind::BadRequest => ProgressError::Validation(err.message().to_string()),
            _ => ProgressError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert_eq!(ProgressError::AlreadyEnrolled.kind(), ErrorKind::Conflict);
        assert_eq!(ProgressError::NotEnrolled.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProgressError::Validation("threshold".into()).kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_forbidden_app_error_round_trip() {
        let err: ProgressError = AppError::forbidden("Cannot access another user's data").into();
        assert!(matches!(err, ProgressError::Forbidden(_)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
