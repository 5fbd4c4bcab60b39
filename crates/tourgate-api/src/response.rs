// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, Role};

// =============================================================================
// Login Response
// =============================================================================

/// Body returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The signed token.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    /// The subject the token was issued to.
    pub subject: String,
    /// The role carried by the token.
    pub role: Role,
}

impl LoginResponse {
    /// Creates a login response for `identity`.
    pub fn new(token: String, expires_in: i64, identity: Identity) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            subject: identity.subject,
            role: identity.role,
        }
    }
}

// =============================================================================
// Identity Response
// =============================================================================

/// Body returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// The caller's subject.
    pub subject: String,
    /// The caller's role.
    pub role: Role,
    /// Request ID for correlation.
    pub request_id: String,
}

// =============================================================================
// Health Responses
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: crate::VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service accepts traffic.
    pub ready: bool,
    /// Number of access rules loaded.
    pub rules: usize,
    /// Signing algorithm in use.
    pub algorithm: String,
    /// Seconds since startup.
    pub uptime_secs: i64,
}
