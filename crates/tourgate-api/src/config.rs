// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Settings for [`ApiServer`](crate::ApiServer): bind address, timeouts,
//! CORS allow-list and the token service.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::TokenConfig;

// =============================================================================
// ApiConfig
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port; 0 picks a free one.
    pub port: u16,
    /// Browser origin policy.
    pub cors: CorsConfig,
    /// Signing settings.
    pub token: TokenConfig,
    /// Per-request deadline; expiry answers 408.
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after shutdown starts.
    pub shutdown_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            token: TokenConfig::default(),
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// `0.0.0.0:8080`, 30 s timeouts, default CORS, empty secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// `host:port`.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Replaces the bind address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Replaces the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces the token settings.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Replaces the CORS policy.
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers; `*` allows any.
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials.
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://victorytandreas.github.io".to_string(),
            ],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Returns `true` if any method is allowed.
    pub fn allows_any_method(&self) -> bool {
        self.allowed_methods.iter().any(|m| m == "*")
    }

    /// Returns `true` if any header is allowed.
    pub fn allows_any_header(&self) -> bool {
        self.allowed_headers.iter().any(|h| h == "*")
    }
}
