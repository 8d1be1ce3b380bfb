//! Auth Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use platform::metrics::HttpMetrics;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::presentation::guard::{require_activated_user, require_admin, require_authenticated_user};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the API router for any repository implementation
///
/// Guards are applied per route; the pipeline layers are added by
/// [`crate::presentation::pipeline::Pipeline::wrap`].
pub fn auth_router<R>(
    repo: Arc<R>,
    config: AuthConfig,
    environment: impl Into<Arc<str>>,
    metrics: Option<Arc<HttpMetrics>>,
) -> Router
where
    R: AuthStore,
{
    let state = AuthAppState {
        repo,
        config: Arc::new(config),
        environment: environment.into(),
        metrics,
    };

    Router::new()
        .route("/v1/healthcheck", get(handlers::healthcheck::<R>))
        .route(
            "/v1/tokens/authentication",
            post(handlers::create_authentication_token::<R>),
        )
        .route(
            "/v1/users/me",
            require_authenticated_user(get(handlers::current_user)),
        )
        .route(
            "/v1/users/logout",
            require_activated_user(delete(handlers::logout::<R>)),
        )
        .route(
            "/v1/users/movie-permission",
            require_admin(post(handlers::grant_movie_write_permission::<R>)),
        )
        .route("/debug/metrics", get(handlers::metrics::<R>))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
}
