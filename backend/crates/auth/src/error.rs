//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::collections::BTreeMap;

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed, unknown or expired bearer token
    #[error("invalid or missing authentication token")]
    InvalidAuthenticationToken,

    /// Anonymous request on a route that needs a user
    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    InactiveAccount,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    NotPermitted,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Wrong email or password
    #[error("invalid authentication credentials")]
    InvalidCredentials,

    #[error("this user already has this permission")]
    DuplicatePermission,

    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// Malformed request body
    #[error("{0}")]
    BadRequest(String),

    /// Field-level validation failures
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation failure
    pub fn validation(field: impl Into<String>, message: impl ToString) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), message.to_string());
        AuthError::Validation(errors)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidAuthenticationToken
            | AuthError::AuthenticationRequired
            | AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::InactiveAccount | AuthError::NotPermitted => ErrorKind::Forbidden,
            AuthError::RateLimitExceeded => ErrorKind::TooManyRequests,
            AuthError::BadRequest(_) => ErrorKind::BadRequest,
            AuthError::DuplicatePermission
            | AuthError::DuplicateEmail
            | AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Convert to AppError
    ///
    /// Server-side failures collapse to the generic message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(errors) => {
                AppError::unprocessable("validation failed").with_field_errors(errors.clone())
            }
            AuthError::Database(_) | AuthError::Internal(_) => AppError::internal(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidAuthenticationToken => {
                tracing::warn!("Invalid authentication token presented");
            }
            AuthError::RateLimitExceeded => {
                tracing::info!("Rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let bearer_challenge = matches!(self, AuthError::InvalidAuthenticationToken);

        let mut response = self.to_app_error().into_response();
        if bearer_challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AuthError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidAuthenticationToken.status_code(), 401);
        assert_eq!(AuthError::AuthenticationRequired.status_code(), 401);
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::InactiveAccount.status_code(), 403);
        assert_eq!(AuthError::NotPermitted.status_code(), 403);
        assert_eq!(AuthError::RateLimitExceeded.status_code(), 429);
        assert_eq!(AuthError::DuplicatePermission.status_code(), 422);
        assert_eq!(AuthError::Internal("boom".into()).status_code(), 500);
    }

    #[tokio::test]
    async fn test_invalid_token_carries_bearer_challenge() {
        let response = AuthError::InvalidAuthenticationToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "invalid or missing authentication token" })
        );
    }

    #[tokio::test]
    async fn test_authentication_required_has_no_challenge() {
        let response = AuthError::AuthenticationRequired.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_leaked() {
        let response = AuthError::Internal("pool exhausted at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": kernel::error::app_error::SERVER_ERROR_MESSAGE })
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let response = AuthError::validation("email", "must be provided").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": { "email": "must be provided" } })
        );
    }
}
