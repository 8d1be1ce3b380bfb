//! Token Entity
//!
//! A stateful token bound to one user and one scope.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_object::{
    token_plaintext::TokenPlaintext, token_scope::TokenScope, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// Token entity
///
/// The plaintext is handed to the client once and never stored.
#[derive(Debug, Clone)]
pub struct Token {
    pub plaintext: TokenPlaintext,
    /// SHA-256 of the plaintext
    pub hash: [u8; 32],
    pub user_id: UserId,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
    /// Client IP the token was issued to
    pub origin_ip: Option<String>,
}

impl Token {
    /// Create a fresh token expiring `ttl` from now
    pub fn generate(
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
        origin_ip: Option<String>,
    ) -> AuthResult<Self> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid token TTL: {e}")))?;

        let plaintext = TokenPlaintext::generate();
        let hash = plaintext.hash();

        Ok(Self {
            plaintext,
            hash,
            user_id,
            expiry: Utc::now() + ttl,
            scope,
            origin_ip,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.expiry <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let token = Token::generate(
            UserId::new(7),
            Duration::from_secs(3600),
            TokenScope::Authentication,
            Some("203.0.113.5".to_string()),
        )
        .unwrap();

        assert_eq!(token.hash, token.plaintext.hash());
        assert_eq!(token.user_id, UserId::new(7));
        assert!(!token.is_expired());
        assert!(token.expiry <= Utc::now() + chrono::Duration::hours(1));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let token =
            Token::generate(UserId::new(1), Duration::ZERO, TokenScope::Activation, None).unwrap();
        assert!(token.is_expired());
    }
}
