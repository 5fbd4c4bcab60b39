// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Test fixtures.

use tourgate_api::{ApiConfig, Role, StaticCredentials, TokenConfig, TokenService};

// =============================================================================
// Secrets
// =============================================================================

/// 40-byte secret; selects HS256.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A different secret of the same length.
pub const OTHER_SECRET: &str = "another-integration-secret-9876543210zyx";

// =============================================================================
// Token Fixtures
// =============================================================================

/// Token service fixtures.
pub struct TokenFixtures;

impl TokenFixtures {
    /// Token configuration over [`TEST_SECRET`].
    pub fn config() -> TokenConfig {
        TokenConfig::new(TEST_SECRET)
    }

    /// Token service over [`TEST_SECRET`].
    pub fn service() -> TokenService {
        Self::service_with(Self::config())
    }

    /// Token service over an arbitrary configuration.
    pub fn service_with(config: TokenConfig) -> TokenService {
        TokenService::new(config).expect("Failed to create token service")
    }
}

// =============================================================================
// User Fixtures
// =============================================================================

/// Users, one per role.
pub struct UserFixtures;

impl UserFixtures {
    /// Shared password of every fixture user.
    pub const PASSWORD: &'static str = "correct-horse-battery";

    /// The fixture email for `role`.
    pub fn email_for(role: Role) -> &'static str {
        match role {
            Role::SeniorTravelConsultant => "stc@agency.test",
            Role::CustomerServiceExecutive => "cse@agency.test",
            Role::MarketingManager => "mm@agency.test",
            Role::GeneralManager => "gm@agency.test",
        }
    }

    /// A directory holding one user per role.
    pub fn directory() -> StaticCredentials {
        Role::ALL.into_iter().fold(StaticCredentials::new(), |dir, role| {
            dir.with_user(Self::email_for(role), Self::PASSWORD, role)
        })
    }
}

// =============================================================================
// API Fixtures
// =============================================================================

/// API configuration fixtures.
pub struct ApiFixtures;

impl ApiFixtures {
    /// Loopback configuration over [`TEST_SECRET`].
    pub fn config() -> ApiConfig {
        ApiConfig::new()
            .with_host([127, 0, 0, 1].into())
            .with_port(0)
            .with_token(TokenFixtures::config())
    }
}

// =============================================================================
// Config File Fixtures
// =============================================================================

/// Configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Smallest valid YAML document.
    pub fn minimal_yaml() -> String {
        format!(
            r#"
security:
  token:
    secret: "{}"
"#,
            TEST_SECRET
        )
    }

    /// YAML document exercising every section.
    pub fn full_yaml() -> String {
        format!(
            r#"
server:
  host: 127.0.0.1
  port: 8181
  request_timeout_secs: 10
  shutdown_timeout_secs: 5

security:
  token:
    secret: "{secret}"
    ttl_ms: 7200000
    issuer: tourgate
  cors:
    allowed_origins: ["http://localhost:5173"]
    allow_credentials: true
  rules:
    - pattern: /health
      access: public
    - pattern: /api/auth/**
      access: public
    - pattern: /api/consultant/**
      access: role
      roles: [SENIOR_TRAVEL_CONSULTANT]
    - pattern: /api/admin/**
      access: any_role
      roles: [GENERAL_MANAGER, MARKETING_MANAGER]
    - pattern: /**
      access: authenticated

users:
  - email: gm@agency.test
    password: "{password}"
    role: GENERAL_MANAGER
  - email: stc@agency.test
    password: "{password}"
    role: SENIOR_TRAVEL_CONSULTANT

logging:
  level: debug
  format: compact
"#,
            secret = TEST_SECRET,
            password = UserFixtures::PASSWORD
        )
    }

    /// TOML document with a custom port.
    pub fn toml() -> String {
        format!(
            r#"
[server]
port = 9393

[security.token]
secret = "{}"
ttl_ms = 60000

[[security.rules]]
pattern = "/api/marketing/**"
access = "role"
roles = ["MARKETING_MANAGER"]

[[security.rules]]
pattern = "/**"
access = "authenticated"
"#,
            TEST_SECRET
        )
    }
}
