//! Presentation Layer
//!
//! HTTP handlers, DTOs and router. Routes expect the auth middleware to
//! have placed a `Principal` in the request extensions.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ProgressAppState;
pub use router::{progress_router, progress_router_generic};
