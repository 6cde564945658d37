//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, hex/Base64, random material)
//! - Client and device identification from request headers
//! - Interfaces to external providers (object storage, email, payments, video)

pub mod client;
pub mod crypto;
pub mod providers;
