//! Value Objects

pub mod risk;
pub mod status;
pub mod streak;
