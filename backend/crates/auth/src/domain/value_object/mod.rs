//! Value Object Module

pub mod email;
pub mod permission;
pub mod token_plaintext;
pub mod token_scope;
pub mod user_id;
