//! Entity Module

pub mod identity;
pub mod token;
pub mod user;
