// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tourgate-api
//!
//! Stateless token authentication and role-based access control for the
//! tourgate HTTP API.
//!
//! Every request passes through an [`AccessGate`](auth::AccessGate): an
//! ordered table of path patterns decides whether a route is public, needs
//! any valid token, or needs specific roles. Tokens are HMAC-signed JWTs
//! issued and validated by a [`TokenService`](auth::TokenService) holding a
//! single shared secret.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AccessGate, AccessRule, AuthContext, AuthError, Claims, GateDecision, Identity, Rejection,
    Role, RolePredicate, RuleTable, TokenConfig, TokenService,
};
pub use config::{ApiConfig, CorsConfig};
pub use credentials::{CredentialVerifier, StaticCredentials};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
