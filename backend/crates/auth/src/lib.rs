//! Auth (Token) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Refresh records, blacklist entries, repository traits
//! - `application/` - Token issuing, rotation, revocation, cleanup
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Token Model
//! - Short-lived HS256 access tokens, verified locally
//! - Long-lived refresh tokens, stored only as SHA-256 hashes and bound to a device
//! - Refresh rotation: the presented token is deactivated before a new pair is issued
//! - Per-user device cap with least-recently-used eviction
//! - Access tokens revoked before expiry go on a blacklist until their own `exp`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    AuthConfig, CleanupExpiredUseCase, CleanupReport, IssueTokenPairUseCase, TokenCodec,
    TokenPair, spawn_cleanup_job,
};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, PgAuthRepository};
pub use presentation::{
    AuthMiddlewareState, BearerToken, auth_router, auth_router_generic, require_access_token,
    require_roles,
};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
