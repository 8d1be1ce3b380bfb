//! Route Guards
//!
//! Decorators that wrap a single route with an authorization check.
//! They compose: activation implies authentication, and permission or
//! admin checks imply activation.
//!
//! ```ignore
//! Router::new()
//!     .route("/v1/users/me", require_authenticated_user(get(me)))
//!     .route("/v1/movies", require_permission(MOVIES_WRITE, repo, post(create)))
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::application::AuthorizeUseCase;
use crate::application::authorize::{activated_user, admin_user, authenticated_user};
use crate::domain::repository::PermissionRepository;
use crate::error::AuthResult;
use crate::presentation::extract::CurrentUser;

// Layers added later run first, so each decorator adds its own check and
// then hands the route to the weaker decorator it builds on.

/// Reject anonymous requests with 401
pub fn require_authenticated_user<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn(authenticated_guard))
}

/// Additionally reject users that have not activated their account with 403
pub fn require_activated_user<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    require_authenticated_user(route.route_layer(middleware::from_fn(activated_guard)))
}

/// Additionally require the permission `code`, looked up per request
pub fn require_permission<S, P>(
    code: &'static str,
    permission_repo: Arc<P>,
    route: MethodRouter<S>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
    P: PermissionRepository + Send + Sync + 'static,
{
    let state = PermissionGuard {
        code,
        permission_repo,
    };
    require_activated_user(
        route.route_layer(middleware::from_fn_with_state(state, permission_guard::<P>)),
    )
}

/// Additionally require the admin flag
pub fn require_admin<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    require_activated_user(route.route_layer(middleware::from_fn(admin_guard)))
}

async fn authenticated_guard(
    CurrentUser(identity): CurrentUser,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    authenticated_user(&identity)?;
    Ok(next.run(req).await)
}

async fn activated_guard(
    CurrentUser(identity): CurrentUser,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    activated_user(&identity)?;
    Ok(next.run(req).await)
}

async fn admin_guard(
    CurrentUser(identity): CurrentUser,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    admin_user(&identity)?;
    Ok(next.run(req).await)
}

struct PermissionGuard<P> {
    code: &'static str,
    permission_repo: Arc<P>,
}

impl<P> Clone for PermissionGuard<P> {
    fn clone(&self) -> Self {
        Self {
            code: self.code,
            permission_repo: self.permission_repo.clone(),
        }
    }
}

async fn permission_guard<P>(
    State(guard): State<PermissionGuard<P>>,
    CurrentUser(identity): CurrentUser,
    req: Request,
    next: Next,
) -> AuthResult<Response>
where
    P: PermissionRepository + Send + Sync + 'static,
{
    AuthorizeUseCase::new(guard.permission_repo)
        .require_permission(&identity, guard.code)
        .await?;
    Ok(next.run(req).await)
}
