//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::metrics::{HttpMetrics, METRICS_CONTENT_TYPE};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    GrantPermissionUseCase, IssueTokenInput, IssueTokenUseCase, SignOutUseCase,
};
use crate::domain::repository::AuthStore;
use crate::domain::value_object::permission::MOVIES_WRITE;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CreateAuthenticationTokenRequest, CreateAuthenticationTokenResponse, GrantPermissionRequest,
    GrantPermissionResponse, HealthcheckResponse, MessageResponse, UserBody, UserResponse,
};
use crate::presentation::extract::{AuthUser, ClientIp};

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    /// Deployment environment reported by the healthcheck
    pub environment: Arc<str>,
    /// `None` when metrics are disabled
    pub metrics: Option<Arc<HttpMetrics>>,
}

impl<R> Clone for AuthAppState<R>
where
    R: AuthStore,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            environment: self.environment.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

// ============================================================================
// Healthcheck
// ============================================================================

/// GET /v1/healthcheck
pub async fn healthcheck<R>(State(state): State<AuthAppState<R>>) -> Json<HealthcheckResponse>
where
    R: AuthStore,
{
    Json(HealthcheckResponse {
        status: "available",
        environment: state.environment.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Authentication Token
// ============================================================================

/// POST /v1/tokens/authentication
pub async fn create_authentication_token<R>(
    State(state): State<AuthAppState<R>>,
    client_ip: ClientIp,
    payload: Result<Json<CreateAuthenticationTokenRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let Json(req) = payload?;

    let use_case =
        IssueTokenUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let token = use_case
        .execute(IssueTokenInput {
            email: req.email,
            password: req.password,
            origin_ip: client_ip.0.map(|ip| ip.to_string()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAuthenticationTokenResponse::from(token)),
    ))
}

// ============================================================================
// Users
// ============================================================================

/// GET /v1/users/me
pub async fn current_user(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        user: UserBody::from(&user),
    })
}

/// DELETE /v1/users/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    AuthUser(user): AuthUser,
    client_ip: ClientIp,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
{
    let origin_ip = client_ip.0.map(|ip| ip.to_string());

    SignOutUseCase::new(state.repo.clone())
        .execute(user.id, origin_ip.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        message: "user successfully logged out".to_string(),
    }))
}

/// POST /v1/users/movie-permission
pub async fn grant_movie_write_permission<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<GrantPermissionRequest>, JsonRejection>,
) -> AuthResult<Json<GrantPermissionResponse>>
where
    R: AuthStore,
{
    let Json(req) = payload?;

    let use_case = GrantPermissionUseCase::new(state.repo.clone(), state.repo.clone());
    let user = use_case.execute(req.email, MOVIES_WRITE).await?;

    Ok(Json(GrantPermissionResponse {
        permission: MOVIES_WRITE,
        email: user.email.into_db(),
    }))
}

// ============================================================================
// Metrics
// ============================================================================

/// GET /debug/metrics
pub async fn metrics<R>(State(state): State<AuthAppState<R>>) -> Response
where
    R: AuthStore,
{
    let Some(metrics) = &state.metrics else {
        return not_found().await;
    };

    match metrics.encode() {
        Ok(text) => ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], text).into_response(),
        Err(e) => AuthError::Internal(format!("Failed to encode metrics: {e}")).into_response(),
    }
}

// ============================================================================
// Fallbacks
// ============================================================================

pub async fn not_found() -> Response {
    AppError::not_found("the requested resource could not be found").into_response()
}

pub async fn method_not_allowed(method: Method) -> Response {
    AppError::new(
        kernel::error::kind::ErrorKind::MethodNotAllowed,
        format!("the {method} method is not supported for this resource"),
    )
    .into_response()
}
