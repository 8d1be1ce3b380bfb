//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{token::Token, user::User};

// ============================================================================
// Healthcheck
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthcheckResponse {
    pub status: &'static str,
    pub environment: String,
    pub version: &'static str,
}

// ============================================================================
// Authentication Token
// ============================================================================

/// Create authentication token request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthenticationTokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBody {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

/// Create authentication token response
#[derive(Debug, Clone, Serialize)]
pub struct CreateAuthenticationTokenResponse {
    pub authentication_token: TokenBody,
}

impl From<Token> for CreateAuthenticationTokenResponse {
    fn from(token: Token) -> Self {
        Self {
            authentication_token: TokenBody {
                token: token.plaintext.as_str().to_string(),
                expiry: token.expiry,
            },
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// Public view of a user; never includes the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserBody {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub activated: bool,
    pub admin: bool,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get(),
            created_at: user.created_at,
            name: user.name.clone(),
            email: user.email.to_string(),
            activated: user.activated,
            admin: user.admin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: UserBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Permissions
// ============================================================================

/// Grant permission request
#[derive(Debug, Clone, Deserialize)]
pub struct GrantPermissionRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantPermissionResponse {
    pub permission: &'static str,
    pub email: String,
}
