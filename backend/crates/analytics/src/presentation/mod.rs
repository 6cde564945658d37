//! Presentation Layer
//!
//! Routes expect the auth middleware to have placed a `Principal` in the
//! request extensions.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AnalyticsAppState;
pub use router::{analytics_router, analytics_router_generic};
