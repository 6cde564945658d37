//! Application Layer

pub mod config;
pub mod service;

pub use config::AnalyticsConfig;
pub use service::AnalyticsService;
