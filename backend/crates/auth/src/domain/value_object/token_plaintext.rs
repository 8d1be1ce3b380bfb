//! Token Plaintext Value Object
//!
//! The client-visible half of a token: 32 random bytes, URL-safe base64
//! without padding. Only its SHA-256 hash is ever stored.

use std::fmt;

use platform::crypto::{random_bytes, sha256, to_base64_url};
use thiserror::Error;

/// Random bytes behind each token
pub const TOKEN_ENTROPY_BYTES: usize = 32;

/// Encoded length of [`TOKEN_ENTROPY_BYTES`] in unpadded base64
pub const TOKEN_PLAINTEXT_LENGTH: usize = 43;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenPlaintextError {
    #[error("must be provided")]
    Empty,

    #[error("must be 43 bytes long")]
    InvalidLength,

    #[error("must only contain URL-safe base64 characters")]
    InvalidCharacter,
}

/// Shape-checked token plaintext
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPlaintext(String);

impl TokenPlaintext {
    /// Fresh plaintext from the OS CSPRNG
    pub fn generate() -> Self {
        Self(to_base64_url(&random_bytes(TOKEN_ENTROPY_BYTES)))
    }

    /// Validate a plaintext supplied by a client
    pub fn parse(raw: &str) -> Result<Self, TokenPlaintextError> {
        if raw.is_empty() {
            return Err(TokenPlaintextError::Empty);
        }

        if raw.len() != TOKEN_PLAINTEXT_LENGTH {
            return Err(TokenPlaintextError::InvalidLength);
        }

        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(TokenPlaintextError::InvalidCharacter);
        }

        Ok(Self(raw.to_owned()))
    }

    /// SHA-256 of the plaintext, as stored
    pub fn hash(&self) -> [u8; 32] {
        sha256(self.0.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TokenPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenPlaintext")
            .field(&"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_plaintext_is_valid() {
        let token = TokenPlaintext::generate();
        assert_eq!(token.as_str().len(), TOKEN_PLAINTEXT_LENGTH);
        assert_eq!(TokenPlaintext::parse(token.as_str()), Ok(token));
    }

    #[test]
    fn test_generated_plaintexts_differ() {
        assert_ne!(TokenPlaintext::generate(), TokenPlaintext::generate());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(TokenPlaintext::parse(""), Err(TokenPlaintextError::Empty));
        assert_eq!(
            TokenPlaintext::parse("short"),
            Err(TokenPlaintextError::InvalidLength)
        );
        assert_eq!(
            TokenPlaintext::parse(&"+".repeat(TOKEN_PLAINTEXT_LENGTH)),
            Err(TokenPlaintextError::InvalidCharacter)
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let token = TokenPlaintext::parse(&"a".repeat(TOKEN_PLAINTEXT_LENGTH)).unwrap();
        assert_eq!(token.hash(), token.clone().hash());
        assert_ne!(token.hash(), TokenPlaintext::generate().hash());
    }

    #[test]
    fn test_debug_redaction() {
        let token = TokenPlaintext::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }
}
