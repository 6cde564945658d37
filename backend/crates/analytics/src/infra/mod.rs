//! Infrastructure Layer

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAnalyticsSource;
pub use postgres::PgAnalyticsSource;
