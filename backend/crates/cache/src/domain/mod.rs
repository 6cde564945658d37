//! Domain Layer

pub mod entity;
pub mod key_pattern;
pub mod repository;

pub use entity::CacheEntry;
pub use key_pattern::KeyPattern;
pub use repository::CacheRepository;
