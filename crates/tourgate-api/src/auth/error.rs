// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication error taxonomy.

use thiserror::Error;

/// Result type alias for token and rule-table operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised by the token service and the rule table.
///
/// `Configuration` is fatal at startup. The three token variants are
/// non-retryable and are collapsed into a single 401 before leaving the gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Secret missing or too short, bad TTL, or malformed rule table.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Token could not be decoded or its claims are inconsistent.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Internal reason, never shown to clients.
        reason: String,
    },

    /// Token signature does not verify against the shared key.
    #[error("Token signature mismatch")]
    Signature,

    /// Token expiry is at or before the current time.
    #[error("Token has expired")]
    Expired,

    /// Caller passed an empty subject to `issue`.
    #[error("Token subject must not be empty")]
    EmptySubject,
}

impl AuthError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invalid token error.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Returns `true` for startup-fatal configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns `true` for errors produced while validating a presented token.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. } | Self::Signature | Self::Expired
        )
    }

    /// Short machine-readable label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Signature => "signature",
            Self::Expired => "expired",
            Self::EmptySubject => "empty_subject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(AuthError::configuration("x").is_configuration());
        assert!(AuthError::Expired.is_token_rejection());
        assert!(AuthError::Signature.is_token_rejection());
        assert!(AuthError::invalid_token("bad").is_token_rejection());
        assert!(!AuthError::EmptySubject.is_token_rejection());
    }
}
