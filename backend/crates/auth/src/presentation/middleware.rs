//! Pipeline Middleware
//!
//! Rate limiting and bearer-token authentication, applied to every request.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::rate_limit::RateLimiterRegistry;

use crate::application::AuthenticateUseCase;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;
use crate::presentation::extract::{ClientIp, CurrentUser};

/// Reject clients that have exhausted their token bucket
pub async fn rate_limit(
    State(limiter): State<RateLimiterRegistry>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(req).await;
    }

    let client = ClientIp::from_parts(req.headers(), req.extensions()).key();

    if !limiter.allow(&client).await {
        tracing::debug!(client = %client, "Request rate limited");
        return AuthError::RateLimitExceeded.into_response();
    }

    next.run(req).await
}

/// Resolve the `Authorization` header into a [`CurrentUser`] extension
///
/// Every response leaving this layer varies on `Authorization`.
pub async fn authenticate<R>(State(repo): State<Arc<R>>, mut req: Request, next: Next) -> Response
where
    R: UserRepository + Send + Sync + 'static,
{
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.as_bytes().to_vec());

    let use_case = AuthenticateUseCase::new(repo);

    let mut response = match use_case.execute(authorization.as_deref()).await {
        Ok(identity) => {
            req.extensions_mut().insert(CurrentUser(identity));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));

    response
}
