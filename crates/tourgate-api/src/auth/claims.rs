// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, AuthResult, Identity, Role};

/// Claims signed into every token.
///
/// `jti`, `sub`, `role`, `iat` and `exp` are always present. Timestamps are
/// Unix seconds (RFC 7519 NumericDate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Unique token identifier, for traceability only.
    pub jti: String,

    /// Subject - the user's email.
    pub sub: String,

    /// The single role granted to the subject.
    pub role: Role,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Creates claims for `subject` issued at `issued_at` and valid for `ttl_secs`.
    pub fn new(subject: impl Into<String>, role: Role, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();

        Self {
            jti: Uuid::new_v4().to_string(),
            sub: subject.into(),
            role,
            iat,
            exp: iat + ttl_secs,
            iss: None,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Checks the structural invariants that hold for every token we issue.
    pub fn check_consistency(&self) -> AuthResult<()> {
        if self.sub.is_empty() {
            return Err(AuthError::invalid_token("empty subject"));
        }
        if self.jti.is_empty() {
            return Err(AuthError::invalid_token("empty token id"));
        }
        if self.exp <= self.iat {
            return Err(AuthError::invalid_token("expiry not after issued-at"));
        }
        Ok(())
    }

    /// Returns `true` if the token is expired at `now` (`now >= exp`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Extracts the identity carried by these claims.
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.role)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = Claims::new("gm@agency.test", Role::GeneralManager, now, 3600);

        assert_eq!(claims.sub, "gm@agency.test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
        assert!(claims.check_consistency().is_ok());
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_claims_unique_ids() {
        let now = Utc::now();
        let a = Claims::new("a@agency.test", Role::MarketingManager, now, 60);
        let b = Claims::new("a@agency.test", Role::MarketingManager, now, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::new("user@agency.test", Role::MarketingManager, now, 10);

        let at_expiry = DateTime::from_timestamp(claims.exp, 0).unwrap();
        assert!(claims.is_expired_at(at_expiry));
        assert!(!claims.is_expired_at(at_expiry - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_claims_inconsistent() {
        let claims = Claims::new("user@agency.test", Role::GeneralManager, Utc::now(), 0);
        assert!(matches!(
            claims.check_consistency(),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims::new("cs@agency.test", Role::CustomerServiceExecutive, Utc::now(), 60);
        let json = serde_json::to_value(&claims).unwrap();

        for field in ["jti", "sub", "role", "iat", "exp"] {
            assert!(json.get(field).is_some(), "missing claim {}", field);
        }
        assert_eq!(json["role"], "CUSTOMER_SERVICE_EXECUTIVE");
        assert!(json.get("iss").is_none());
    }
}
