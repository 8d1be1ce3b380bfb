//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entity::{
    token::Token,
    user::{NewUser, User},
};
use crate::domain::value_object::{
    email::Email, permission::Permissions, token_plaintext::TokenPlaintext,
    token_scope::TokenScope, user_id::UserId,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find the owner of an unexpired token with the given scope
    async fn get_for_token(
        &self,
        scope: TokenScope,
        plaintext: &TokenPlaintext,
    ) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn get_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Create a new user; fails with `DuplicateEmail` if the email is taken
    async fn insert(&self, user: NewUser) -> AuthResult<User>;
}

/// Permission repository trait
#[trait_variant::make(PermissionRepository: Send)]
pub trait LocalPermissionRepository {
    /// All permission codes held by a user
    async fn get_all_for_user(&self, user_id: UserId) -> AuthResult<Permissions>;

    /// Grant codes to a user; fails with `DuplicatePermission` if any is already held
    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AuthResult<()>;
}

/// Token repository trait
#[trait_variant::make(TokenRepository: Send)]
pub trait LocalTokenRepository {
    /// Generate and persist a token
    async fn new_token(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
        origin_ip: Option<String>,
    ) -> AuthResult<Token>;

    /// Persist an already generated token
    async fn insert(&self, token: &Token) -> AuthResult<()>;

    /// Delete every token of `scope` for the user, optionally only those issued to `origin_ip`
    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
        origin_ip: Option<&str>,
    ) -> AuthResult<u64>;
}

/// Everything the request pipeline needs from storage
pub trait AuthStore:
    UserRepository + PermissionRepository + TokenRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + PermissionRepository + TokenRepository + Clone + Send + Sync + 'static
{
}
