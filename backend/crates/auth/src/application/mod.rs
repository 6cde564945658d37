//! Application Layer
//!
//! Use cases and application services.

pub mod blacklist_access;
pub mod cleanup;
pub mod config;
pub mod issue_tokens;
pub mod jwt;
pub mod logout;
pub mod revoke_tokens;
pub mod rotate_refresh;
pub mod verify_access;

// Re-exports
pub use blacklist_access::BlacklistAccessUseCase;
pub use cleanup::{CleanupExpiredUseCase, CleanupReport, spawn_cleanup_job};
pub use config::AuthConfig;
pub use issue_tokens::{IssueTokenPairUseCase, TokenPair};
pub use jwt::TokenCodec;
pub use logout::LogoutUseCase;
pub use revoke_tokens::RevokeTokensUseCase;
pub use rotate_refresh::{RotateRefreshUseCase, RotatedTokens};
pub use verify_access::VerifyAccessUseCase;
