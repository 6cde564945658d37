//! Cache Backend Module
//!
//! Generic TTL key-value cache persisted in the shared store. Values are
//! opaque JSON; expiry is logical (`get` ignores expired rows) with a
//! physical sweep run by scheduled maintenance.
//!
//! Clean Architecture structure:
//! - `domain/` - Cache entry, repository trait, key patterns
//! - `application/` - `CacheService`, configuration
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP response cache middleware

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CacheConfig;
pub use application::service::CacheService;
pub use domain::repository::CacheRepository;
pub use error::{CacheError, CacheResult};
pub use infra::memory::InMemoryCacheRepository;
pub use infra::postgres::PgCacheRepository;
pub use presentation::middleware::{ResponseCacheState, response_cache};

#[cfg(test)]
mod tests;
