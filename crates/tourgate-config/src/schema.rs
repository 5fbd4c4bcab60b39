// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for tourgate.
//!
//! # Schema Structure
//!
//! ```text
//! TourgateConfig
//! ├── server: ServerConfig
//! ├── security: SecurityConfig
//! │   ├── token: TokenConfig
//! │   ├── cors: CorsConfig
//! │   └── rules: Option<Vec<RuleConfig>>
//! ├── users: Vec<UserConfig>
//! └── logging: LoggingConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL_MS: u64 = 86_400_000;

/// Minimum token lifetime.
pub const MIN_TOKEN_TTL_MS: u64 = 1_000;

/// Minimum secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

// =============================================================================
// TourgateConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TourgateConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token, CORS and access rule settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Development user directory.
    ///
    /// Passwords are stored in plain text. Leave this empty in production
    /// and put a real credential store behind the login endpoint.
    #[serde(default)]
    pub users: Vec<UserConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TourgateConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;

        let mut emails = HashSet::new();
        for (i, user) in self.users.iter().enumerate() {
            user.validate(i)?;
            if !emails.insert(user.email.trim().to_lowercase()) {
                return Err(ConfigError::validation(
                    format!("users[{}].email", i),
                    format!("duplicate email '{}'", user.email),
                ));
            }
        }

        self.logging.validate()?;

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout_secs: default_timeout_secs(),
            shutdown_timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Token, CORS and rule table settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Token settings.
    #[serde(default)]
    pub token: TokenConfig,

    /// CORS allow-list.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Ordered access rules; the built-in table is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleConfig>>,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.token.validate()?;
        self.cors.validate()?;

        if let Some(ref rules) = self.rules {
            if rules.is_empty() {
                return Err(ConfigError::validation(
                    "security.rules",
                    "must not be empty; omit the section to use the built-in table",
                ));
            }
            for (i, rule) in rules.iter().enumerate() {
                rule.validate(i)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Token Configuration
// =============================================================================

/// Token signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Shared signing secret. Never serialized.
    #[serde(default, skip_serializing)]
    pub secret: Option<SecretValue>,

    /// Token lifetime in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Issuer claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Pinned signing algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<TokenAlgorithm>,
}

fn default_ttl_ms() -> u64 {
    DEFAULT_TOKEN_TTL_MS
}

impl TokenConfig {
    /// Validates the token configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let secret = match self.secret {
            Some(ref secret) if !secret.is_empty() => secret,
            _ => {
                return Err(ConfigError::validation(
                    "security.token.secret",
                    "a signing secret is required",
                ))
            }
        };

        if secret.is_unresolved_placeholder() {
            return Err(ConfigError::validation(
                "security.token.secret",
                format!("environment variable in '{}' is not set", secret.expose()),
            ));
        }

        let required = self
            .algorithm
            .map(|a| a.min_secret_len())
            .unwrap_or(MIN_SECRET_LEN);
        if secret.len() < required {
            return Err(ConfigError::validation(
                "security.token.secret",
                format!(
                    "must be at least {} bytes, got {}",
                    required,
                    secret.len()
                ),
            ));
        }

        if self.ttl_ms < MIN_TOKEN_TTL_MS {
            return Err(ConfigError::validation(
                "security.token.ttl_ms",
                format!("must be at least {}", MIN_TOKEN_TTL_MS),
            ));
        }

        if let Some(ref issuer) = self.issuer {
            if issuer.trim().is_empty() {
                return Err(ConfigError::validation(
                    "security.token.issuer",
                    "cannot be empty when set",
                ));
            }
        }

        Ok(())
    }

    /// Returns the token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_ms: DEFAULT_TOKEN_TTL_MS,
            issuer: None,
            algorithm: None,
        }
    }
}

/// HMAC algorithm names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenAlgorithm {
    /// HMAC-SHA256.
    HS256,
    /// HMAC-SHA384.
    HS384,
    /// HMAC-SHA512.
    HS512,
}

impl TokenAlgorithm {
    /// Minimum secret length for the algorithm.
    pub fn min_secret_len(&self) -> usize {
        match self {
            TokenAlgorithm::HS256 => 32,
            TokenAlgorithm::HS384 => 48,
            TokenAlgorithm::HS512 => 64,
        }
    }
}

// =============================================================================
// CORS Configuration
// =============================================================================

/// Cross-origin allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    /// Allowed methods; `*` allows any.
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers; `*` allows any.
    #[serde(default = "default_headers")]
    pub allowed_headers: Vec<String>,

    /// Whether credentials are allowed.
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age: u64,
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
        "https://victorytandreas.github.io".to_string(),
    ]
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_headers() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allow_credentials() -> bool {
    true
}

fn default_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Validates the allow-list entries.
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, method) in self.allowed_methods.iter().enumerate() {
            if method != "*" && !is_method_token(method) {
                return Err(ConfigError::validation(
                    format!("security.cors.allowed_methods[{}]", i),
                    format!("'{}' is not an HTTP method name or '*'", method),
                ));
            }
        }
        Ok(())
    }
}

/// An RFC 9110 token, without `*` so a stray wildcard is never a method name.
fn is_method_token(method: &str) -> bool {
    !method.is_empty()
        && method
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'+-.^_`|~".contains(&b))
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
            allow_credentials: default_allow_credentials(),
            max_age: default_max_age(),
        }
    }
}

// =============================================================================
// Rule Configuration
// =============================================================================

/// Access level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// No credential needed.
    Public,
    /// Any valid token.
    Authenticated,
    /// Exactly one role.
    Role,
    /// Any of several roles.
    AnyRole,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessKind::Public => "public",
            AccessKind::Authenticated => "authenticated",
            AccessKind::Role => "role",
            AccessKind::AnyRole => "any_role",
        };
        f.write_str(s)
    }
}

/// One entry of the ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Ant-style path pattern.
    pub pattern: String,

    /// Access level.
    pub access: AccessKind,

    /// Role names for `role` and `any_role`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl RuleConfig {
    /// Validates the rule at position `index`.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        let field = |name: &str| format!("security.rules[{}].{}", index, name);

        if !self.pattern.trim().starts_with('/') {
            return Err(ConfigError::validation(
                field("pattern"),
                format!("must start with '/', got '{}'", self.pattern),
            ));
        }

        let count = self.roles.len();
        let valid = match self.access {
            AccessKind::Public | AccessKind::Authenticated => count == 0,
            AccessKind::Role => count == 1,
            AccessKind::AnyRole => count >= 1,
        };
        if !valid {
            let expected = match self.access {
                AccessKind::Public | AccessKind::Authenticated => "no roles",
                AccessKind::Role => "exactly one role",
                AccessKind::AnyRole => "at least one role",
            };
            return Err(ConfigError::validation(
                field("roles"),
                format!("'{}' takes {}, got {}", self.access, expected, count),
            ));
        }

        if let Some(empty) = self.roles.iter().position(|r| r.trim().is_empty()) {
            return Err(ConfigError::validation(
                field(&format!("roles[{}]", empty)),
                "role name cannot be empty",
            ));
        }

        Ok(())
    }
}

// =============================================================================
// User Configuration
// =============================================================================

/// A user in the static development directory. Not for production use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Login email.
    pub email: String,

    /// Plain password. Never serialized.
    #[serde(skip_serializing)]
    pub password: SecretValue,

    /// Role name.
    pub role: String,
}

impl UserConfig {
    /// Validates the user at position `index`.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        if self.email.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("users[{}].email", index),
                "cannot be empty",
            ));
        }
        if self.password.is_empty() {
            return Err(ConfigError::validation(
                format!("users[{}].password", index),
                "cannot be empty",
            ));
        }
        if self.role.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("users[{}].role", index),
                "cannot be empty",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the value is a `${VAR}` placeholder left unresolved.
    pub fn is_unresolved_placeholder(&self) -> bool {
        self.0.starts_with("${") && self.0.ends_with('}')
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

// =============================================================================
// Tests
// =============================================================================
