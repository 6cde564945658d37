//! Domain Entities

pub mod metrics;
pub mod report;
