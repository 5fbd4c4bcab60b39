// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method, StatusCode, Uri},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::{RuleTable, TokenService};
use crate::config::{ApiConfig, CorsConfig};
use crate::credentials::CredentialVerifier;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::GateLayer;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(create_cors_layer(&self.config.cors))
            .layer(GateLayer::new(self.state.gate.clone()));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/me", get(handlers::current_identity))
            .fallback(fallback)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Binds the configured address and serves until `shutdown_signal` fires.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener.
    ///
    /// In-flight requests get the configured shutdown timeout to finish once
    /// the signal fires; the server stops regardless after that.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let grace = self.config.shutdown_timeout();
        let router = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!("Starting API server on {}", addr);
        }

        let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
        let signal = async move {
            shutdown_signal.await;
            let _ = signalled_tx.send(());
        };

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .into_future();

        let deadline = async move {
            match signalled_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = server => {
                result.map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;
            }
            _ = deadline => {
                warn!(timeout_secs = grace.as_secs(), "Graceful shutdown timed out");
            }
        }

        info!("API server shutdown complete");
        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path().to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from the allow-list.
///
/// Wildcards are mirrored from the request when credentials are allowed,
/// since `*` is not valid alongside credentials.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    // Origins
    if cors.allowed_origins.iter().any(|o| o == "*") {
        layer = if cors.allow_credentials {
            layer.allow_origin(AllowOrigin::mirror_request())
        } else {
            layer.allow_origin(Any)
        };
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer = layer.allow_origin(AllowOrigin::list(origins));
    }

    // Methods
    if cors.allows_any_method() {
        layer = if cors.allow_credentials {
            layer.allow_methods(AllowMethods::mirror_request())
        } else {
            layer.allow_methods(Any)
        };
    } else {
        let methods: Vec<Method> = cors
            .allowed_methods
            .iter()
            .filter_map(|m| match m.parse() {
                Ok(method) => Some(method),
                Err(_) => {
                    warn!(method = %m, "Ignoring invalid CORS method");
                    None
                }
            })
            .collect();
        layer = layer.allow_methods(methods);
    }

    // Headers
    if cors.allows_any_header() {
        layer = if cors.allow_credentials {
            layer.allow_headers(AllowHeaders::mirror_request())
        } else {
            layer.allow_headers(Any)
        };
    } else {
        let headers: Vec<axum::http::HeaderName> = cors
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        layer = layer.allow_headers(headers);
    }

    // Credentials
    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the token service.
    pub fn tokens(mut self, tokens: Arc<TokenService>) -> Self {
        self.state_builder = self.state_builder.tokens(tokens);
        self
    }

    /// Sets the rule table.
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.state_builder = self.state_builder.rules(rules);
        self
    }

    /// Sets the credential verifier.
    pub fn credentials(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.state_builder = self.state_builder.credentials(verifier);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        state.rules().log_summary();
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::TokenConfig;

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_token(TokenConfig::new("test-secret-key-that-is-long-enough"))
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed_origin() {
        let router = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap()
            .router();

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/admin/users")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_unknown_origin() {
        let router = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap()
            .router();

        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcards_with_credentials() {
        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        let router = ApiServerBuilder::new()
            .config(test_config().with_cors(cors))
            .build()
            .unwrap()
            .router();

        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://any.example")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://any.example"
        );
    }

    #[tokio::test]
    async fn test_cors_any_method() {
        let cors = CorsConfig {
            allowed_methods: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        let router = ApiServerBuilder::new()
            .config(test_config().with_cors(cors))
            .build()
            .unwrap()
            .router();

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/auth/login")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PURGE")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "PURGE"
        );
    }
}
