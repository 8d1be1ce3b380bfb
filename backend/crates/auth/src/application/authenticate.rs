//! Authenticate Use Case
//!
//! Resolves an `Authorization` header value into a request identity.

use std::sync::Arc;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{token_plaintext::TokenPlaintext, token_scope::TokenScope};
use crate::error::{AuthError, AuthResult};

/// Authenticate use case
pub struct AuthenticateUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> AuthenticateUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// `None` means the header was absent; an empty or blank value counts
    /// as absent too.
    ///
    /// A non-empty header must be exactly `Bearer <token>`; anything else,
    /// including an unknown or expired token, is `InvalidAuthenticationToken`.
    pub async fn execute(&self, authorization: Option<&[u8]>) -> AuthResult<Identity> {
        let Some(raw) = authorization.filter(|raw| !raw.trim_ascii().is_empty()) else {
            return Ok(Identity::Anonymous);
        };

        let plaintext = parse_bearer(raw)?;

        let user = self
            .user_repo
            .get_for_token(TokenScope::Authentication, &plaintext)
            .await?
            .ok_or(AuthError::InvalidAuthenticationToken)?;

        tracing::debug!(user_id = %user.id, "Request authenticated");

        Ok(Identity::User(user))
    }
}

fn parse_bearer(raw: &[u8]) -> AuthResult<TokenPlaintext> {
    let value = std::str::from_utf8(raw).map_err(|_| AuthError::InvalidAuthenticationToken)?;

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::InvalidAuthenticationToken);
    };
    if *scheme != "Bearer" {
        return Err(AuthError::InvalidAuthenticationToken);
    }

    TokenPlaintext::parse(token).map_err(|_| AuthError::InvalidAuthenticationToken)
}
