//! Sign Out Use Case
//!
//! Deletes the authentication tokens a user was issued from one client.

use std::sync::Arc;

use crate::domain::repository::TokenRepository;
use crate::domain::value_object::{token_scope::TokenScope, user_id::UserId};
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<T>
where
    T: TokenRepository,
{
    token_repo: Arc<T>,
}

impl<T> SignOutUseCase<T>
where
    T: TokenRepository,
{
    pub fn new(token_repo: Arc<T>) -> Self {
        Self { token_repo }
    }

    /// Sign out from the client at `origin_ip`.
    ///
    /// With no known client address every authentication token of the user is removed.
    pub async fn execute(&self, user_id: UserId, origin_ip: Option<&str>) -> AuthResult<u64> {
        let deleted = self
            .token_repo
            .delete_all_for_user(TokenScope::Authentication, user_id, origin_ip)
            .await?;

        tracing::info!(
            user_id = %user_id,
            origin_ip = origin_ip.unwrap_or("*"),
            deleted = deleted,
            "User signed out"
        );

        Ok(deleted)
    }
}
