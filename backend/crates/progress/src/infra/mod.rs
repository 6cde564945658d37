//! Infrastructure Layer
//!
//! Repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryProgressRepository;
pub use postgres::PgProgressRepository;
