//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{identity::Identity, token::Token, user::NewUser, user::User};
pub use repository::{AuthStore, PermissionRepository, TokenRepository, UserRepository};
pub use value_object::{
    email::Email, permission::Permissions, token_plaintext::TokenPlaintext,
    token_scope::TokenScope, user_id::UserId,
};
