// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tourgate-config
//!
//! Configuration management for the tourgate access gateway.
//!
//! ## Features
//!
//! - **Schema Definition**: Server, token, CORS, rule table, users and logging
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: Override config values via environment variables
//! - **Secret Redaction**: Secrets never appear in `Debug` or serialized output
//!
//! ## Quick Start
//!
//! ```no_run
//! use tourgate_config::loader::load_config;
//!
//! let config = load_config("tourgate.yaml").unwrap();
//! println!("Port: {}", config.server.port);
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - Bind address and timeouts
//! - `security` - Token signing, CORS allow-list and the ordered rule table
//! - `users` - Static development user directory
//! - `logging` - Logging configuration
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! security:
//!   token:
//!     secret: "${TOURGATE_JWT_SECRET}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    load_config, load_config_str, parse_log_format, parse_log_level, resolve_env_placeholders,
    ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX,
};
pub use schema::{
    AccessKind, CorsConfig, LogFormat, LogLevel, LoggingConfig, RuleConfig, SecretValue,
    SecurityConfig, ServerConfig, TokenAlgorithm, TokenConfig, TourgateConfig, UserConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
