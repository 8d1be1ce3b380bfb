//! Auth (Authorization Pipeline) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Users, tokens, permissions, request identity, repository traits
//! - `application/` - Use cases (authenticate, authorize, issue token, sign out, grant)
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - Middleware, route guards, handlers, router, pipeline
//!
//! ## Request flow
//! metrics -> panic recovery -> CORS -> rate limit -> authenticate -> router,
//! then per-route guards (authenticated -> activated -> permission/admin).
//!
//! ## Security Model
//! - Opaque bearer tokens; only their SHA-256 hash is stored
//! - Passwords hashed with Argon2id
//! - Per-client-IP token bucket rate limiting

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::identity::Identity;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryAuthRepository, postgres::PgAuthRepository};
pub use presentation::pipeline::{Pipeline, PipelineConfig};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
