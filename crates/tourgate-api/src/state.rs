// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! State handed to every handler: the gate, the credential verifier and
//! the server settings.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{AccessGate, RuleTable, TokenService};
use crate::config::ApiConfig;
use crate::credentials::{CredentialVerifier, StaticCredentials};
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Everything in here is immutable once built; clones share the same
/// token service and rule table.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Access gate (token service plus rule table).
    pub gate: AccessGate,
    /// Credential verifier used by the login handler.
    pub credentials: Arc<dyn CredentialVerifier>,
    /// When the state was built.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Starts an [`AppStateBuilder`].
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        self.gate.tokens()
    }

    /// Returns the rule table.
    pub fn rules(&self) -> &RuleTable {
        self.gate.rules()
    }

    /// Returns the credential verifier.
    pub fn credentials(&self) -> &Arc<dyn CredentialVerifier> {
        &self.credentials
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .field("started_at", &self.started_at)
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Assembles an [`AppState`], filling gaps with defaults.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    tokens: Option<Arc<TokenService>>,
    rules: Option<Arc<RuleTable>>,
    credentials: Option<Arc<dyn CredentialVerifier>>,
}

impl AppStateBuilder {
    /// Nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Server settings; defaults when unset.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token service.
    pub fn tokens(mut self, tokens: Arc<TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the rule table.
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    /// Sets the credential verifier.
    pub fn credentials(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = Some(verifier);
        self
    }

    /// Builds the AppState.
    ///
    /// The token service is created from the configuration when not supplied,
    /// and the default rule table is used when no table is given. Fails on
    /// an unusable token configuration.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(TokenService::new(config.token.clone())?),
        };

        let rules = match self.rules {
            Some(rules) => rules,
            None => Arc::new(RuleTable::default_table()?),
        };

        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(StaticCredentials::new()));

        Ok(AppState {
            config: Arc::new(config),
            gate: AccessGate::new(tokens, rules),
            credentials,
            started_at: Utc::now(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;

    fn test_config() -> ApiConfig {
        ApiConfig::default()
            .with_token(TokenConfig::new("test-secret-key-that-is-long-enough-for-testing"))
    }

    #[test]
    fn test_app_state_builder() {
        let state = AppState::builder().config(test_config()).build().unwrap();

        assert!(!state.rules().is_empty());
        assert_eq!(state.tokens().ttl_secs(), 86_400);
    }

    #[test]
    fn test_app_state_requires_secret() {
        let err = AppState::builder().build().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_app_state_custom_rules() {
        let rules = RuleTable::builder().public(["/**"]).build().unwrap();
        let state = AppState::builder()
            .config(test_config())
            .rules(rules)
            .build()
            .unwrap();

        assert_eq!(state.rules().len(), 1);
    }
}
