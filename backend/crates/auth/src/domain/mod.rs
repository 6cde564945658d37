//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    blacklist_entry::BlacklistEntry, refresh_token::RefreshTokenRecord, user::UserSnapshot,
};
pub use repository::{BlacklistRepository, RefreshTokenRepository, UserRepository};
