//! Value Objects

pub mod scope;
pub mod time_range;
