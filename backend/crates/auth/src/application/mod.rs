//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod authorize;
pub mod config;
pub mod grant_permission;
pub mod issue_token;
pub mod sign_out;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use authorize::AuthorizeUseCase;
pub use config::AuthConfig;
pub use grant_permission::GrantPermissionUseCase;
pub use issue_token::{IssueTokenInput, IssueTokenUseCase};
pub use sign_out::SignOutUseCase;
