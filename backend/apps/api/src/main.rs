//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors go through `auth::AuthError` and `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{AuthConfig, PgAuthRepository, Pipeline, PipelineConfig, auth_router};
use platform::metrics::HttpMetrics;
use platform::rate_limit::RateLimiterRegistry;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = Arc::new(PgAuthRepository::new(pool));

    // Startup cleanup: remove expired tokens
    // Errors here should not prevent server startup
    match repo.delete_expired_tokens().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Expired token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Expired token cleanup failed, continuing anyway"
            );
        }
    }

    let limiter = RateLimiterRegistry::new(config.limiter.clone());
    let sweeper = limiter.is_enabled().then(|| limiter.start_sweeper());

    let metrics = if config.metrics_enabled {
        Some(Arc::new(HttpMetrics::new()?))
    } else {
        None
    };

    let (auth_config, pipeline_config) = if config.is_development() {
        (AuthConfig::development(), PipelineConfig::development())
    } else {
        (AuthConfig::default(), PipelineConfig::default())
    };
    let pipeline_config = match &config.trusted_origins {
        Some(origins) => PipelineConfig::new(origins.iter().cloned()),
        None => pipeline_config,
    };

    tracing::info!(
        environment = %config.environment,
        limiter_enabled = config.limiter.enabled,
        trusted_origins = ?pipeline_config.trusted_origins,
        metrics_enabled = metrics.is_some(),
        "Building request pipeline"
    );

    // Build router
    let router = auth_router(
        repo.clone(),
        auth_config,
        config.environment.as_str(),
        metrics.clone(),
    );
    let app = Pipeline::new(pipeline_config, limiter, metrics)
        .wrap(router, repo)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.stop();
    }

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
