//! Presentation Layer

pub mod middleware;

pub use middleware::{CachedResponse, ResponseCacheState, response_cache};
