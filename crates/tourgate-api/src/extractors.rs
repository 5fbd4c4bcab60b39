// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{AuthContext, Identity};
use crate::error::ApiError;

// =============================================================================
// Authenticated
// =============================================================================

/// Extractor for requests that carry a validated identity.
///
/// Returns 401 when the gate let the request through anonymously, which
/// happens on public routes reached without a token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Authenticated(identity): Authenticated) -> impl IntoResponse {
///     format!("Hello, {}", identity.subject)
/// }
/// ```
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone())
            .map(Authenticated)
            .ok_or_else(|| ApiError::unauthorized("no identity in request context"))
    }
}

// =============================================================================
// MaybeAuthenticated
// =============================================================================

/// Extractor for the identity if one was presented.
pub struct MaybeAuthenticated(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity.clone());
        Ok(MaybeAuthenticated(identity))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Extractor for the request ID assigned by the gate.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
///
/// Prefers `X-Forwarded-For`, then `X-Real-IP`, then the socket address
/// recorded by the gate.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        let real_ip = parts
            .headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = real_ip {
            return Ok(ClientIp(Some(ip)));
        }

        let from_ctx = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip);

        Ok(ClientIp(from_ctx))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::auth::Role;

    fn parts_with(ctx: Option<AuthContext>) -> Parts {
        let mut req = Request::builder()
            .uri("/test")
            .header("X-Real-IP", "10.0.0.7")
            .body(())
            .unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn test_authenticated_extractor() {
        let identity = Identity::new("gm@agency.test", Role::GeneralManager);
        let mut parts = parts_with(Some(AuthContext::authenticated(identity.clone())));

        let Authenticated(found) = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found, identity);
    }

    #[tokio::test]
    async fn test_authenticated_rejects_anonymous() {
        let mut parts = parts_with(Some(AuthContext::anonymous()));
        let err = Authenticated::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        let mut parts = parts_with(None);
        assert!(Authenticated::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_maybe_authenticated() {
        let mut parts = parts_with(Some(AuthContext::anonymous()));
        let MaybeAuthenticated(identity) = MaybeAuthenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_request_id_and_client_ip() {
        let ctx = AuthContext::anonymous();
        let expected = ctx.request_id;
        let mut parts = parts_with(Some(ctx));

        let RequestId(id) = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, expected);

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, Some("10.0.0.7".parse().unwrap()));
    }
}
