//! External Providers
//!
//! Narrow interfaces over the collaborators the platform talks to but does
//! not implement: object storage, email delivery, payment gateway and video
//! conferencing. Implementations here are development stand-ins, except
//! [`video::JitsiProvider`] which only needs URL construction.

pub mod email;
pub mod payment;
pub mod storage;
pub mod video;

use kernel::error::app_error::AppError;
use thiserror::Error;

pub use email::{EmailMessage, EmailSender, LogEmailSender, send_in_background};
pub use payment::{PaymentGateway, PaymentOrder, StubPaymentGateway};
pub use storage::{InMemoryObjectStorage, ObjectStorage, StoredObject, UploadFile};
pub use video::{
    JitsiProvider, StubGoogleMeetProvider, StubZoomProvider, VideoProvider, VideoSession,
    VideoSessionDetails,
};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure reported by (or while talking to) an external provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    fn log(&self) {
        match self {
            ProviderError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Provider misconfigured");
            }
            _ => tracing::warn!(error = %self, "External provider failure"),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        err.log();
        match err {
            ProviderError::ObjectNotFound(id) => {
                AppError::not_found(format!("Object not found: {id}"))
            }
            other => AppError::upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::kind::ErrorKind;

    #[test]
    fn test_provider_errors_map_to_bad_gateway() {
        let err: AppError = ProviderError::RequestFailed {
            provider: "email",
            message: "connection reset".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::BadGateway);

        let err: AppError = ProviderError::ObjectNotFound("lms/abc".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
