//! Request Pipeline
//!
//! Wraps a router in the fixed middleware chain, outermost first:
//!
//! 1. metrics
//! 2. panic recovery
//! 3. CORS
//! 4. rate limit
//! 5. authenticate
//!
//! Route guards sit inside this chain, on individual routes.

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::metrics::{HttpMetrics, track_metrics};
use platform::rate_limit::RateLimiterRegistry;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::domain::repository::UserRepository;
use crate::presentation::middleware::{authenticate, rate_limit};

/// Pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Origins allowed to make cross-origin requests, matched exactly
    pub trusted_origins: Vec<String>,
}

impl PipelineConfig {
    pub fn new(trusted_origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            trusted_origins: trusted_origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Local frontend dev servers
    pub fn development() -> Self {
        Self::new(["http://localhost:3000", "http://127.0.0.1:3000"])
    }
}

/// Middleware chain composer
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    limiter: RateLimiterRegistry,
    metrics: Option<Arc<HttpMetrics>>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        limiter: RateLimiterRegistry,
        metrics: Option<Arc<HttpMetrics>>,
    ) -> Self {
        Self {
            config,
            limiter,
            metrics,
        }
    }

    /// Apply the full chain around `router`
    pub fn wrap<R>(&self, router: Router, repo: Arc<R>) -> Router
    where
        R: UserRepository + Send + Sync + 'static,
    {
        router.layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(self.metrics.clone(), track_metrics))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(self.cors_layer())
                .layer(from_fn_with_state(self.limiter.clone(), rate_limit))
                .layer(from_fn_with_state(repo, authenticate::<R>)),
        )
    }

    /// CORS negotiation against the trusted origin list
    ///
    /// `OPTIONS` requests are answered here and never reach the router.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config
            .trusted_origins
            .iter()
            .filter(|origin| origin.as_str() != "*")
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unparsable trusted origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::list([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ]))
            .allow_headers(AllowHeaders::list([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
            ]))
    }
}

/// Turn a handler panic into one generic 500 and close the connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let mut response = AppError::internal().into_response();
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}
