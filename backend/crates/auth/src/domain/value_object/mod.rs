//! Value Objects

pub mod claims;
pub mod reason;
pub mod revoke_scope;
pub mod token_hash;
