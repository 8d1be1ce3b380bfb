//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, middleware, guards, router and the
//! pipeline composer.

pub mod dto;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod router;

pub use extract::{AuthUser, ClientIp, CurrentUser};
pub use guard::{require_activated_user, require_admin, require_authenticated_user, require_permission};
pub use handlers::AuthAppState;
pub use middleware::{authenticate, rate_limit};
pub use pipeline::{Pipeline, PipelineConfig};
pub use router::auth_router;
