//! Domain Entities

pub mod blacklist_entry;
pub mod refresh_token;
pub mod user;
