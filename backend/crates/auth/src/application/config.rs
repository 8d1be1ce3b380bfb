//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::domain::value_object::token_scope::TokenScope;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Activation token TTL (3 days)
    pub activation_token_ttl: Duration,
    /// Authentication token TTL (24 hours)
    pub authentication_token_ttl: Duration,
    /// Password reset token TTL (45 minutes)
    pub password_reset_token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            activation_token_ttl: Duration::from_secs(3 * 24 * 3600), // 3 days
            authentication_token_ttl: Duration::from_secs(24 * 3600), // 24 hours
            password_reset_token_ttl: Duration::from_secs(45 * 60),   // 45 minutes
        }
    }
}

impl AuthConfig {
    /// Create config for development (week-long sessions)
    pub fn development() -> Self {
        Self {
            authentication_token_ttl: Duration::from_secs(7 * 24 * 3600),
            ..Default::default()
        }
    }

    /// Lifetime of a freshly issued token of `scope`
    pub fn ttl_for(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::Activation => self.activation_token_ttl,
            TokenScope::Authentication => self.authentication_token_ttl,
            TokenScope::PasswordReset => self.password_reset_token_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = AuthConfig::default();
        assert_eq!(
            config.ttl_for(TokenScope::Activation),
            Duration::from_secs(259_200)
        );
        assert_eq!(
            config.ttl_for(TokenScope::Authentication),
            Duration::from_secs(86_400)
        );
        assert_eq!(
            config.ttl_for(TokenScope::PasswordReset),
            Duration::from_secs(2_700)
        );
    }

    #[test]
    fn test_development_keeps_other_ttls() {
        let config = AuthConfig::development();
        assert_eq!(
            config.ttl_for(TokenScope::Authentication),
            Duration::from_secs(604_800)
        );
        assert_eq!(
            config.ttl_for(TokenScope::Activation),
            AuthConfig::default().activation_token_ttl
        );
    }
}
