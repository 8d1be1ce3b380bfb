//! Grant Permission Use Case
//!
//! Adds a permission code to the user owning an email address.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{PermissionRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Grant permission use case
pub struct GrantPermissionUseCase<U, P>
where
    U: UserRepository,
    P: PermissionRepository,
{
    user_repo: Arc<U>,
    permission_repo: Arc<P>,
}

impl<U, P> GrantPermissionUseCase<U, P>
where
    U: UserRepository,
    P: PermissionRepository,
{
    pub fn new(user_repo: Arc<U>, permission_repo: Arc<P>) -> Self {
        Self {
            user_repo,
            permission_repo,
        }
    }

    /// Returns the user the code was granted to
    pub async fn execute(&self, email: String, code: &str) -> AuthResult<User> {
        let email = Email::new(email).map_err(|e| AuthError::validation("email", e))?;

        let user = self
            .user_repo
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::validation("email", "no matching email address found"))?;

        self.permission_repo.add_for_user(user.id, &[code]).await?;

        tracing::info!(user_id = %user.id, permission = code, "Permission granted");

        Ok(user)
    }
}
