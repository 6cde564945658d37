//! Shared Kernel - vocabulary every learning-platform crate agrees on
//!
//! This crate contains only what has the same meaning in every context:
//! - The unified error type ([`error::app_error::AppError`]) and its kinds
//! - Typed entity identifiers ([`id`])
//! - The authenticated caller ([`principal`]) handed from auth to the other contexts
//!
//! Anything that belongs to a single context (tokens, progress, analytics)
//! stays in that context's crate.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod principal;
