//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, random bytes, URL-safe Base64)
//! - Password hashing (Argon2id)
//! - Client IP extraction
//! - In-memory per-client rate limiting
//! - HTTP metrics collection

pub mod client;
pub mod crypto;
pub mod metrics;
pub mod password;
pub mod rate_limit;
