//! Request Extractors
//!
//! Typed access to what the pipeline attached to a request.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use platform::client::{UNKNOWN_CLIENT, extract_client_ip};

use crate::domain::entity::{identity::Identity, user::User};
use crate::error::AuthError;

/// Identity attached by the authenticator middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AuthError::Internal("authenticate middleware is not installed".into()))
    }
}

/// The authenticated user; anonymous requests are rejected
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await?.0 {
            Identity::Anonymous => Err(AuthError::AuthenticationRequired),
            Identity::User(user) => Ok(AuthUser(user)),
        }
    }
}

/// Best known address of the client
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn from_parts(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let direct = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        ClientIp(extract_client_ip(headers, direct))
    }

    /// Rate limiter key
    pub fn key(&self) -> String {
        self.0
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp::from_parts(&parts.headers, &parts.extensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_missing_current_user_is_server_error() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_auth_user_rejects_anonymous() {
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(CurrentUser(Identity::Anonymous));
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::AuthenticationRequired)));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000))));

        let mut headers = HeaderMap::new();
        assert_eq!(ClientIp::from_parts(&headers, &extensions).key(), "10.0.0.1");

        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());
        assert_eq!(ClientIp::from_parts(&headers, &extensions).key(), "203.0.113.7");

        assert_eq!(
            ClientIp::from_parts(&HeaderMap::new(), &Extensions::new()).key(),
            UNKNOWN_CLIENT
        );
    }
}
