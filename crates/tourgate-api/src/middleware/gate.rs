// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access gate middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AccessGate, AuthContext, AuthError, GateDecision, Rejection};
use crate::error::ApiError;

// =============================================================================
// GateLayer
// =============================================================================

/// Layer that runs every request through an [`AccessGate`].
///
/// Rejected requests never reach the inner service. Accepted requests carry
/// an [`AuthContext`] in their extensions.
#[derive(Debug, Clone)]
pub struct GateLayer {
    gate: AccessGate,
}

impl GateLayer {
    /// Creates a new gate layer.
    pub fn new(gate: AccessGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            gate: self.gate.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

/// Middleware produced by [`GateLayer`].
#[derive(Debug, Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    gate: AccessGate,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let request_id = Uuid::now_v7();
        let path = req.uri().path().to_string();

        let decision = match authorization_header(&req) {
            Ok(header) => self.gate.intercept(&path, header),
            Err(err) => GateDecision::Reject(Rejection::InvalidCredential(err)),
        };

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let identity = match decision {
                GateDecision::Proceed(identity) => identity,
                GateDecision::Reject(rejection) => {
                    tracing::debug!(
                        request_id = %request_id,
                        path = %path,
                        reason = rejection.reason(),
                        "Request rejected by access gate"
                    );
                    return Ok(ApiError::from(rejection).into_response());
                }
            };

            if let Some(ref identity) = identity {
                tracing::trace!(
                    request_id = %request_id,
                    path = %path,
                    subject = %identity.subject,
                    role = %identity.role,
                    "Request authorized"
                );
            }

            let mut ctx = AuthContext::from_identity(identity).with_request_id(request_id);
            if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
                ctx = ctx.with_client_ip(addr.ip());
            }
            req.extensions_mut().insert(ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Reads the `Authorization` header.
///
/// A header that is present but not valid visible ASCII counts as a
/// malformed credential rather than a missing one.
fn authorization_header<B>(req: &Request<B>) -> Result<Option<&str>, AuthError> {
    match req.headers().get(header::AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| AuthError::invalid_token("authorization header is not ASCII")),
    }
}

// =============================================================================
// Tests
// =============================================================================
