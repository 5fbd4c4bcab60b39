// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential verification for the login flow.
//!
//! The gate never sees passwords. Login handlers ask a [`CredentialVerifier`]
//! whether an email/password pair is valid and, if so, which role to issue.

use std::collections::HashMap;

use async_trait::async_trait;
use subtle::ConstantTimeEq;

use crate::auth::{Identity, Role};

/// Verifies login credentials against a user directory.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the identity for valid credentials, `None` otherwise.
    async fn verify(&self, email: &str, password: &str) -> Option<Identity>;
}

// =============================================================================
// StaticCredentials
// =============================================================================

#[derive(Clone)]
struct StaticUser {
    email: String,
    password: String,
    role: Role,
}

/// In-memory user directory loaded from configuration.
///
/// Emails are matched case-insensitively. Passwords are held in plain text
/// and compared in constant time; use it for development and tests only.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, StaticUser>,
}

impl StaticCredentials {
    /// Creates an empty directory that rejects every login.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, replacing any existing entry for the same email.
    pub fn with_user(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        let email = email.into();
        self.users.insert(
            email.to_lowercase(),
            StaticUser {
                email,
                password: password.into(),
                role,
            },
        );
        self
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no users are configured.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("users", &self.users.len())
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, email: &str, password: &str) -> Option<Identity> {
        let user = self.users.get(&email.trim().to_lowercase())?;
        let matches: bool = user.password.as_bytes().ct_eq(password.as_bytes()).into();
        if matches {
            Some(Identity::new(user.email.clone(), user.role))
        } else {
            None
        }
    }
}
