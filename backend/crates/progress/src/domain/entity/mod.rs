//! Domain Entities

pub mod coursework;
pub mod enrollment;
pub mod progress_record;
