//! Issue Token Use Case
//!
//! Exchanges email + password for a new authentication token.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use platform::password::{ClearTextPassword, HashedPassword};

use crate::application::config::AuthConfig;
use crate::domain::entity::token::Token;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, token_scope::TokenScope};
use crate::error::{AuthError, AuthResult};

/// Issue token input
pub struct IssueTokenInput {
    pub email: String,
    pub password: String,
    /// Client IP recorded on the token
    pub origin_ip: Option<String>,
}

/// Issue token use case
pub struct IssueTokenUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<U, T> IssueTokenUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            token_repo,
            config,
        }
    }

    pub async fn execute(&self, input: IssueTokenInput) -> AuthResult<Token> {
        let (email, password) = validate_credentials(input.email, input.password)?;

        let user = self.user_repo.get_by_email(&email).await?;

        // Argon2 is CPU bound; keep it off the async workers.
        // Unknown emails still pay for one verification.
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hash.verify(&password),
            None => {
                if let Some(hash) = dummy_hash() {
                    hash.verify(&password);
                }
                false
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))?;

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let token = self
            .token_repo
            .new_token(
                user.id,
                self.config.ttl_for(TokenScope::Authentication),
                TokenScope::Authentication,
                input.origin_ip,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Authentication token issued");

        Ok(token)
    }
}

/// Hash verified against when the email has no account
fn dummy_hash() -> Option<&'static HashedPassword> {
    static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            ClearTextPassword::new("no-such-account-password".to_string())
                .ok()?
                .hash()
                .ok()
        })
        .as_ref()
}

fn validate_credentials(email: String, password: String) -> AuthResult<(Email, ClearTextPassword)> {
    let mut errors = BTreeMap::new();

    let email = Email::new(email)
        .map_err(|e| errors.insert("email".to_string(), e.to_string()))
        .ok();
    let password = ClearTextPassword::new(password)
        .map_err(|e| errors.insert("password".to_string(), e.to_string()))
        .ok();

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AuthError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAuthRepository;
    use crate::domain::entity::user::NewUser;

    fn use_case(
        repo: Arc<MemoryAuthRepository>,
    ) -> IssueTokenUseCase<MemoryAuthRepository, MemoryAuthRepository> {
        IssueTokenUseCase::new(repo.clone(), repo, Arc::new(AuthConfig::default()))
    }

    fn input(email: &str, password: &str) -> IssueTokenInput {
        IssueTokenInput {
            email: email.to_string(),
            password: password.to_string(),
            origin_ip: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_fail_alike() {
        let repo = Arc::new(MemoryAuthRepository::new());
        let hash = ClearTextPassword::new("pa55word-long".to_string())
            .unwrap()
            .hash()
            .unwrap();
        UserRepository::insert(
            &*repo,
            NewUser::new("Known", Email::new("known@example.com").unwrap(), hash),
        )
        .await
        .unwrap();
        let use_case = use_case(repo.clone());

        let unknown = use_case.execute(input("nobody@example.com", "pa55word-long")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

        let wrong = use_case.execute(input("known@example.com", "wrong-password")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        assert!(use_case.execute(input("known@example.com", "pa55word-long")).await.is_ok());
        assert_eq!(repo.token_count().await, 1);
    }

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        let hash = dummy_hash().unwrap();
        assert!(hash.as_phc_string().starts_with("$argon2"));

        let guess = ClearTextPassword::new("pa55word-long".to_string()).unwrap();
        assert!(!hash.verify(&guess));
    }

    #[test]
    fn test_validation_collects_every_field() {
        let Err(AuthError::Validation(errors)) =
            validate_credentials(String::new(), "short".to_string())
        else {
            panic!("expected validation error");
        };

        assert_eq!(errors["email"], "must be provided");
        assert_eq!(errors["password"], "must be at least 8 characters long");
    }

    #[test]
    fn test_validation_accepts_good_input() {
        assert!(validate_credentials("a@example.com".into(), "pa55word-long".into()).is_ok());
    }
}
