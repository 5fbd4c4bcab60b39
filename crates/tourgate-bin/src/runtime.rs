// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway runtime orchestration.
//!
//! Turns a validated [`TourgateConfig`] into the API layer's types, builds
//! the server and runs it until shutdown.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use tourgate_api::{
    ApiConfig, ApiServer, ApiServerBuilder, CorsConfig, Role, RolePredicate, RuleTable,
    StaticCredentials, TokenConfig, TokenService,
};
use tourgate_api::auth::SigningAlgorithm;
use tourgate_config::{
    load_config, AccessKind, RuleConfig, TokenAlgorithm, TourgateConfig, UserConfig,
};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Components
// =============================================================================

/// Everything the API server needs, converted from configuration.
pub struct Components {
    /// Server configuration.
    pub api: ApiConfig,
    /// Token service built from the configured secret.
    pub tokens: Arc<TokenService>,
    /// Compiled rule table.
    pub rules: RuleTable,
    /// Static user directory.
    pub credentials: StaticCredentials,
}

impl Components {
    /// Converts a loaded configuration.
    ///
    /// Fails on unknown role names, malformed patterns, and token settings
    /// the token service rejects.
    pub fn from_config(config: &TourgateConfig) -> BinResult<Self> {
        let token = token_config(&config.security.token)?;
        let tokens = TokenService::new(token.clone())
            .map_err(|e| BinError::from(e).with_context("security.token"))?;

        let api = ApiConfig::new()
            .with_host(config.server.host)
            .with_port(config.server.port)
            .with_token(token)
            .with_cors(cors_config(&config.security.cors));
        let api = ApiConfig {
            request_timeout_secs: config.server.request_timeout_secs,
            shutdown_timeout_secs: config.server.shutdown_timeout_secs,
            ..api
        };

        let rules = match config.security.rules {
            Some(ref rules) => rule_table(rules)?,
            None => RuleTable::default_table()?,
        };

        Ok(Self {
            api,
            tokens: Arc::new(tokens),
            rules,
            credentials: credentials(&config.users)?,
        })
    }
}

/// Converts the token section.
pub fn token_config(section: &tourgate_config::TokenConfig) -> BinResult<TokenConfig> {
    let secret = section
        .secret
        .as_ref()
        .ok_or_else(|| BinError::config("security.token.secret is not set"))?;

    let mut token = TokenConfig::new(secret.expose());
    token.ttl_ms = section.ttl_ms;
    if let Some(ref issuer) = section.issuer {
        token = token.with_issuer(issuer.clone());
    }
    if let Some(algorithm) = section.algorithm {
        token = token.with_algorithm(signing_algorithm(algorithm));
    }

    Ok(token)
}

/// Maps a configured algorithm name onto the token service's algorithm.
pub fn signing_algorithm(algorithm: TokenAlgorithm) -> SigningAlgorithm {
    match algorithm {
        TokenAlgorithm::HS256 => SigningAlgorithm::Hs256,
        TokenAlgorithm::HS384 => SigningAlgorithm::Hs384,
        TokenAlgorithm::HS512 => SigningAlgorithm::Hs512,
    }
}

fn cors_config(section: &tourgate_config::CorsConfig) -> CorsConfig {
    CorsConfig {
        allowed_origins: section.allowed_origins.clone(),
        allowed_methods: section.allowed_methods.clone(),
        allowed_headers: section.allowed_headers.clone(),
        allow_credentials: section.allow_credentials,
        max_age: section.max_age,
    }
}

/// Compiles configured rules in declaration order.
pub fn rule_table(rules: &[RuleConfig]) -> BinResult<RuleTable> {
    let mut builder = RuleTable::builder();
    for (i, rule) in rules.iter().enumerate() {
        let predicate = rule_predicate(rule)
            .map_err(|e| e.with_context(format!("security.rules[{}]", i)))?;
        builder = builder.rule(rule.pattern.trim(), predicate);
    }
    Ok(builder.build()?)
}

fn rule_predicate(rule: &RuleConfig) -> BinResult<RolePredicate> {
    let roles = rule
        .roles
        .iter()
        .map(|name| name.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;

    match rule.access {
        AccessKind::Public => Ok(RolePredicate::Public),
        AccessKind::Authenticated => Ok(RolePredicate::Authenticated),
        AccessKind::Role => match roles.as_slice() {
            [role] => Ok(RolePredicate::Role(*role)),
            _ => Err(BinError::config("'role' access takes exactly one role")),
        },
        AccessKind::AnyRole => Ok(RolePredicate::any_of(roles)?),
    }
}

/// Builds the static user directory.
pub fn credentials(users: &[UserConfig]) -> BinResult<StaticCredentials> {
    if !users.is_empty() {
        warn!(
            users = users.len(),
            "Static user directory enabled; passwords are plain text, development use only"
        );
    }

    users
        .iter()
        .enumerate()
        .try_fold(StaticCredentials::new(), |directory, (i, user)| {
            let role = user
                .role
                .parse::<Role>()
                .map_err(|e| BinError::from(e).with_context(format!("users[{}].role", i)))?;
            Ok(directory.with_user(user.email.trim(), user.password.expose(), role))
        })
}

// =============================================================================
// GatewayRuntime
// =============================================================================

/// Runs the API server until shutdown is signaled.
pub struct GatewayRuntime {
    components: Components,
    shutdown: ShutdownCoordinator,
}

impl GatewayRuntime {
    /// Creates a runtime from converted components.
    pub fn new(components: Components) -> Self {
        Self {
            components,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the API server.
    pub fn build_server(&self) -> BinResult<ApiServer> {
        let components = &self.components;
        let server = ApiServerBuilder::new()
            .config(components.api.clone())
            .tokens(components.tokens.clone())
            .rules(components.rules.clone())
            .credentials(Arc::new(components.credentials.clone()))
            .build()?;
        Ok(server)
    }

    /// Runs the gateway until an OS signal arrives.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting tourgate v{}", tourgate_api::VERSION);

        let server = self.build_server()?;
        info!(
            addr = %server.addr(),
            algorithm = %self.components.tokens.algorithm(),
            rules = self.components.rules.len(),
            users = self.components.credentials.len(),
            "tourgate is ready"
        );

        self.shutdown.listen_for_signals();
        server.run_with_shutdown(self.shutdown.shutdown_signal()).await?;

        info!("tourgate shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the gateway runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<TourgateConfig>,
    host: Option<IpAddr>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: TourgateConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the bind address.
    pub fn host(mut self, host: Option<IpAddr>) -> Self {
        self.host = host;
        self
    }

    /// Overrides the bind port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<GatewayRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Failed to load {}", path.display()))
                })?
            }
        };

        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            if port == 0 {
                return Err(BinError::config("port cannot be zero"));
            }
            config.server.port = port;
        }

        Ok(GatewayRuntime::new(Components::from_config(&config)?))
    }
}

// =============================================================================
// Tests
// =============================================================================
