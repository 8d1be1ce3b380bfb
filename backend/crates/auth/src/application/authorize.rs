//! Authorization Checks
//!
//! The decisions behind the route guards. Each check looks at the request
//! identity once and either yields the user or the rejection.

use std::sync::Arc;

use crate::domain::entity::{identity::Identity, user::User};
use crate::domain::repository::PermissionRepository;
use crate::error::{AuthError, AuthResult};

/// Anonymous requests are rejected
pub fn authenticated_user(identity: &Identity) -> AuthResult<&User> {
    match identity {
        Identity::Anonymous => Err(AuthError::AuthenticationRequired),
        Identity::User(user) => Ok(user),
    }
}

/// Authenticated and activated
pub fn activated_user(identity: &Identity) -> AuthResult<&User> {
    let user = authenticated_user(identity)?;
    if !user.is_activated() {
        return Err(AuthError::InactiveAccount);
    }
    Ok(user)
}

/// Activated and admin
pub fn admin_user(identity: &Identity) -> AuthResult<&User> {
    let user = activated_user(identity)?;
    if !user.is_admin() {
        return Err(AuthError::NotPermitted);
    }
    Ok(user)
}

/// Permission check use case
pub struct AuthorizeUseCase<P>
where
    P: PermissionRepository,
{
    permission_repo: Arc<P>,
}

impl<P> AuthorizeUseCase<P>
where
    P: PermissionRepository,
{
    pub fn new(permission_repo: Arc<P>) -> Self {
        Self { permission_repo }
    }

    /// Activated and holding `code`
    pub async fn require_permission(&self, identity: &Identity, code: &str) -> AuthResult<()> {
        let user = activated_user(identity)?;

        let permissions = self.permission_repo.get_all_for_user(user.id).await?;
        if !permissions.includes(code) {
            tracing::debug!(user_id = %user.id, permission = code, "Permission denied");
            return Err(AuthError::NotPermitted);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use platform::password::ClearTextPassword;

    use crate::domain::value_object::{email::Email, user_id::UserId};

    fn user(activated: bool, admin: bool) -> User {
        User {
            id: UserId::new(1),
            name: "Test".to_string(),
            email: Email::new("test@example.com").unwrap(),
            password_hash: ClearTextPassword::new("pa55word-long".to_string())
                .unwrap()
                .hash()
                .unwrap(),
            activated,
            admin,
            version: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_is_rejected_first() {
        let anonymous = Identity::Anonymous;
        assert!(matches!(
            authenticated_user(&anonymous),
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            activated_user(&anonymous),
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            admin_user(&anonymous),
            Err(AuthError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_inactive_user() {
        let identity = Identity::User(user(false, true));
        assert!(authenticated_user(&identity).is_ok());
        assert!(matches!(
            activated_user(&identity),
            Err(AuthError::InactiveAccount)
        ));
        assert!(matches!(
            admin_user(&identity),
            Err(AuthError::InactiveAccount)
        ));
    }

    #[test]
    fn test_admin_flag() {
        assert!(matches!(
            admin_user(&Identity::User(user(true, false))),
            Err(AuthError::NotPermitted)
        ));
        assert!(admin_user(&Identity::User(user(true, true))).is_ok());
    }
}
