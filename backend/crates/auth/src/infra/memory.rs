//! In-Memory Repository Implementation
//!
//! Process-local store with the same semantics as the PostgreSQL one.
//! Used by tests and for running the API without a database.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::entity::{
    token::Token,
    user::{NewUser, User},
};
use crate::domain::repository::{PermissionRepository, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, permission::{self, Permissions}, token_plaintext::TokenPlaintext,
    token_scope::TokenScope, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug)]
struct StoredToken {
    hash: [u8; 32],
    user_id: UserId,
    expiry: DateTime<Utc>,
    scope: TokenScope,
    origin_ip: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_user_id: i64,
    users: BTreeMap<UserId, User>,
    tokens: Vec<StoredToken>,
    permissions: HashMap<UserId, Permissions>,
}

/// In-memory auth repository; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, expired ones included
    pub async fn token_count(&self) -> usize {
        self.state.read().await.tokens.len()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn get_for_token(
        &self,
        scope: TokenScope,
        plaintext: &TokenPlaintext,
    ) -> AuthResult<Option<User>> {
        let hash = plaintext.hash();
        let now = Utc::now();
        let state = self.state.read().await;

        let user = state
            .tokens
            .iter()
            .find(|t| t.hash == hash && t.scope == scope && t.expiry > now)
            .and_then(|t| state.users.get(&t.user_id))
            .cloned();

        Ok(user)
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> AuthResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        state.next_user_id += 1;
        let stored = User {
            id: UserId::new(state.next_user_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            activated: user.activated,
            admin: user.admin,
            version: 1,
            created_at: Utc::now(),
        };
        state.users.insert(stored.id, stored.clone());

        Ok(stored)
    }
}

impl PermissionRepository for MemoryAuthRepository {
    async fn get_all_for_user(&self, user_id: UserId) -> AuthResult<Permissions> {
        let state = self.state.read().await;
        Ok(state.permissions.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AuthResult<()> {
        if let Some(code) = codes.iter().find(|code| !permission::is_known(code)) {
            return Err(AuthError::Internal(format!("unknown permission code: {code}")));
        }

        let mut state = self.state.write().await;
        let held = state.permissions.entry(user_id).or_default();

        // All or nothing, like a single INSERT statement
        if codes.iter().any(|code| held.includes(code)) {
            return Err(AuthError::DuplicatePermission);
        }
        for code in codes {
            held.insert(*code);
        }

        Ok(())
    }
}

impl TokenRepository for MemoryAuthRepository {
    async fn new_token(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
        origin_ip: Option<String>,
    ) -> AuthResult<Token> {
        let token = Token::generate(user_id, ttl, scope, origin_ip)?;
        TokenRepository::insert(self, &token).await?;
        Ok(token)
    }

    async fn insert(&self, token: &Token) -> AuthResult<()> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&token.user_id) {
            return Err(AuthError::Internal(format!(
                "token references unknown user {}",
                token.user_id
            )));
        }

        let now = Utc::now();
        state.tokens.retain(|t| t.expiry > now);

        state.tokens.push(StoredToken {
            hash: token.hash,
            user_id: token.user_id,
            expiry: token.expiry,
            scope: token.scope,
            origin_ip: token.origin_ip.clone(),
        });

        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
        origin_ip: Option<&str>,
    ) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();

        state.tokens.retain(|t| {
            let matches = t.scope == scope
                && t.user_id == user_id
                && origin_ip.is_none_or(|ip| t.origin_ip.as_deref() == Some(ip));
            !matches
        });

        Ok((before - state.tokens.len()) as u64)
    }
}
