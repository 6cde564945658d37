//! Application Layer

pub mod config;
pub mod service;

pub use config::CacheConfig;
pub use service::CacheService;
