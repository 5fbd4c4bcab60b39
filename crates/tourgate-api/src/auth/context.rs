// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request identity and authentication context.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

// =============================================================================
// Identity
// =============================================================================

/// The validated subject and role extracted from a token.
///
/// Scoped to a single request; never stored or shared across requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// User identity, typically an email.
    pub subject: String,
    /// The role granted by the token.
    pub role: Role,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// Returns `true` if the identity holds `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the identity holds any of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

// =============================================================================
// AuthContext
// =============================================================================

/// Authentication context attached to a request by the access gate.
///
/// Lives in the request extensions and is dropped with the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The caller's identity; `None` on public routes reached without a token.
    pub identity: Option<Identity>,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context for an authenticated caller.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates a context for an anonymous caller on a public route.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates a context from an optional identity.
    pub fn from_identity(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => Self::authenticated(identity),
            None => Self::anonymous(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if no identity is attached.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns the subject, if authenticated.
    pub fn subject(&self) -> Option<&str> {
        self.identity.as_ref().map(|id| id.subject.as_str())
    }

    /// Returns the role, if authenticated.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|id| id.role)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================
