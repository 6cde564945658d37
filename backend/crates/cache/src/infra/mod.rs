//! Infrastructure Layer
//!
//! Repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCacheRepository;
pub use postgres::PgCacheRepository;
