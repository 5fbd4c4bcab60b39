// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process HTTP harness.
//!
//! Drives the full router, middleware stack included, with
//! `tower::ServiceExt::oneshot`. No socket is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tourgate_api::{ApiServerBuilder, Role, RuleTable, TokenService};

use super::fixtures::{ApiFixtures, TokenFixtures, UserFixtures};

// =============================================================================
// TestApp
// =============================================================================

/// A router wired with fixture tokens, users and a rule table.
pub struct TestApp {
    router: Router,
    tokens: Arc<TokenService>,
}

impl TestApp {
    /// Creates an app over the default rule table.
    pub fn new() -> Self {
        Self::with_rules(RuleTable::default_table().expect("default rule table"))
    }

    /// Creates an app over `rules`.
    pub fn with_rules(rules: RuleTable) -> Self {
        let tokens = Arc::new(TokenFixtures::service());
        let server = ApiServerBuilder::new()
            .config(ApiFixtures::config())
            .tokens(tokens.clone())
            .rules(rules)
            .credentials(Arc::new(UserFixtures::directory()))
            .build()
            .expect("Failed to build server");

        Self {
            router: server.router(),
            tokens,
        }
    }

    /// Returns the token service shared with the router.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Issues a token for the fixture user holding `role`.
    pub fn token_for(&self, role: Role) -> String {
        self.tokens
            .issue(UserFixtures::email_for(role), role)
            .expect("Failed to issue token")
    }

    /// Sends a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a GET with an optional bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    /// Sends a GET with a raw `Authorization` header value.
    pub async fn get_with_authorization(&self, path: &str, authorization: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// Sends a JSON POST.
    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Posts a login request.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// JSON body, or `Null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// The `error.code` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }

    /// The `error.message` field of an error body.
    pub fn error_message(&self) -> Option<&str> {
        self.body["error"]["message"].as_str()
    }
}
