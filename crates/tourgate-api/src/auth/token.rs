// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance and validation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, AuthResult, Claims, Identity, Role};

/// Smallest secret accepted by any supported algorithm (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Smallest accepted token lifetime.
pub const MIN_TTL: Duration = Duration::from_secs(1);

// =============================================================================
// SigningAlgorithm
// =============================================================================

/// HMAC algorithms usable with the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC-SHA256, needs a 32 byte secret.
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC-SHA384, needs a 48 byte secret.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC-SHA512, needs a 64 byte secret.
    #[serde(rename = "HS512")]
    Hs512,
}

impl SigningAlgorithm {
    /// Picks the strongest algorithm the secret length supports.
    pub fn for_secret_len(len: usize) -> Option<Self> {
        match len {
            l if l >= 64 => Some(Self::Hs512),
            l if l >= 48 => Some(Self::Hs384),
            l if l >= MIN_SECRET_LEN => Some(Self::Hs256),
            _ => None,
        }
    }

    /// Minimum secret length in bytes.
    pub fn min_secret_len(&self) -> usize {
        match self {
            Self::Hs256 => 32,
            Self::Hs384 => 48,
            Self::Hs512 => 64,
        }
    }

    /// Returns the header name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    fn to_jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TokenConfig
// =============================================================================

/// Token service configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared signing secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Issuer claim; required on validation when set.
    pub issuer: Option<String>,
    /// Pinned algorithm; derived from the secret length when absent.
    pub algorithm: Option<SigningAlgorithm>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            ttl_ms: 86_400_000,    // 24 hours
            issuer: None,
            algorithm: None,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Pins the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Returns the token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Validates the configuration and resolves the signing algorithm.
    pub fn resolve_algorithm(&self) -> AuthResult<SigningAlgorithm> {
        if self.secret.is_empty() {
            return Err(AuthError::configuration("token secret is not configured"));
        }

        let len = self.secret.len();
        let algorithm = match self.algorithm {
            Some(pinned) if len < pinned.min_secret_len() => {
                return Err(AuthError::configuration(format!(
                    "token secret is {} bytes but {} requires at least {}",
                    len,
                    pinned,
                    pinned.min_secret_len()
                )));
            }
            Some(pinned) => pinned,
            None => SigningAlgorithm::for_secret_len(len).ok_or_else(|| {
                AuthError::configuration(format!(
                    "token secret is {} bytes, at least {} required",
                    len, MIN_SECRET_LEN
                ))
            })?,
        };

        if self.ttl() < MIN_TTL {
            return Err(AuthError::configuration(format!(
                "token ttl must be at least {} ms, got {}",
                MIN_TTL.as_millis(),
                self.ttl_ms
            )));
        }

        Ok(algorithm)
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_ms", &self.ttl_ms)
            .field("issuer", &self.issuer)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and validates signed tokens.
///
/// Holds the only copy of the signing key. Immutable after construction, so a
/// single instance is shared across all requests.
#[derive(Clone)]
pub struct TokenService {
    algorithm: SigningAlgorithm,
    ttl_secs: i64,
    issuer: Option<String>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenService {
    /// Creates a token service, failing on an unusable configuration.
    pub fn new(config: TokenConfig) -> AuthResult<Self> {
        let algorithm = config.resolve_algorithm()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(algorithm.to_jwt());
        // Expiry is checked against our own clock with `now >= exp` semantics.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            algorithm,
            ttl_secs: config.ttl().as_secs() as i64,
            issuer: config.issuer,
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Issues a token for `subject` with `role`, valid from now for the configured TTL.
    pub fn issue(&self, subject: &str, role: Role) -> AuthResult<String> {
        let claims = self.issue_claims(subject, role, Utc::now())?;
        self.sign(&claims)
    }

    /// Builds the claim set for a token issued at `issued_at`.
    pub fn issue_claims(
        &self,
        subject: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<Claims> {
        if subject.trim().is_empty() {
            return Err(AuthError::EmptySubject);
        }

        let claims = Claims::new(subject, role, issued_at, self.ttl_secs);
        Ok(match self.issuer {
            Some(ref issuer) => claims.with_issuer(issuer),
            None => claims,
        })
    }

    /// Signs an arbitrary claim set.
    pub fn sign(&self, claims: &Claims) -> AuthResult<String> {
        let header = Header::new(self.algorithm.to_jwt());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::configuration(format!("failed to sign token: {}", e)))
    }

    /// Validates a presented token and returns the identity it carries.
    pub fn validate(&self, token: &str) -> AuthResult<Identity> {
        self.validate_at(token, Utc::now()).map(|claims| claims.identity())
    }

    /// Validates a token against the given instant and returns its claims.
    ///
    /// Signature verification happens before any claim is inspected.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify_jwt_error)?;

        claims.check_consistency()?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    /// Returns the algorithm in use.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

fn classify_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::Signature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        kind => AuthError::invalid_token(format!("{:?}", kind)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new(SECRET)).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = service();

        let token = tokens.issue("gm@agency.test", Role::GeneralManager).unwrap();
        let identity = tokens.validate(&token).unwrap();

        assert_eq!(identity, Identity::new("gm@agency.test", Role::GeneralManager));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let tokens = service();
        let token = tokens.issue("mm@agency.test", Role::MarketingManager).unwrap();

        let first = tokens.validate(&token).unwrap();
        let second = tokens.validate(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let issued = Utc::now() - chrono::Duration::days(2);

        let claims = tokens
            .issue_claims("cs@agency.test", Role::CustomerServiceExecutive, issued)
            .unwrap();
        let token = tokens.sign(&claims).unwrap();

        assert_eq!(tokens.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let tokens = service();
        let now = Utc::now();
        let claims = tokens
            .issue_claims("cs@agency.test", Role::CustomerServiceExecutive, now)
            .unwrap();
        let token = tokens.sign(&claims).unwrap();

        let at_expiry = DateTime::from_timestamp(claims.exp, 0).unwrap();
        assert_eq!(tokens.validate_at(&token, at_expiry), Err(AuthError::Expired));
        assert!(tokens
            .validate_at(&token, at_expiry - chrono::Duration::seconds(1))
            .is_ok());
    }

    #[test]
    fn test_invalid_token() {
        let tokens = service();

        for garbage in ["", "invalid.token.here", "not-a-jwt", "a.b", "a.b.c.d"] {
            let err = tokens.validate(garbage).unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidToken { .. }),
                "{} -> {:?}",
                garbage,
                err
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let a = TokenService::new(TokenConfig::new("secret-one-for-testing-purposes-32b")).unwrap();
        let b = TokenService::new(TokenConfig::new("secret-two-for-testing-purposes-32b")).unwrap();

        let token = a.issue("user@agency.test", Role::GeneralManager).unwrap();
        assert_eq!(b.validate(&token), Err(AuthError::Signature));
    }

    #[test]
    fn test_wrong_secret_expired_token_is_signature_error() {
        let a = TokenService::new(TokenConfig::new("secret-one-for-testing-purposes-32b")).unwrap();
        let b = TokenService::new(TokenConfig::new("secret-two-for-testing-purposes-32b")).unwrap();

        let claims = a
            .issue_claims("user@agency.test", Role::GeneralManager, Utc::now() - chrono::Duration::days(3))
            .unwrap();
        let token = a.sign(&claims).unwrap();

        assert_eq!(b.validate(&token), Err(AuthError::Signature));
    }

    #[test]
    fn test_secret_requirements() {
        assert!(TokenService::new(TokenConfig::default())
            .unwrap_err()
            .is_configuration());
        assert!(TokenService::new(TokenConfig::new("too-short"))
            .unwrap_err()
            .is_configuration());
        assert!(TokenService::new(TokenConfig::new(SECRET).with_algorithm(SigningAlgorithm::Hs512))
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_ttl_requirements() {
        let config = TokenConfig::new(SECRET).with_ttl(Duration::from_millis(999));
        assert!(TokenService::new(config).unwrap_err().is_configuration());
    }

    #[test]
    fn test_algorithm_by_secret_length() {
        assert_eq!(SigningAlgorithm::for_secret_len(31), None);
        assert_eq!(SigningAlgorithm::for_secret_len(32), Some(SigningAlgorithm::Hs256));
        assert_eq!(SigningAlgorithm::for_secret_len(48), Some(SigningAlgorithm::Hs384));
        assert_eq!(SigningAlgorithm::for_secret_len(100), Some(SigningAlgorithm::Hs512));

        let long = "x".repeat(64);
        assert_eq!(
            TokenService::new(TokenConfig::new(long)).unwrap().algorithm(),
            SigningAlgorithm::Hs512
        );
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = TokenService::new(TokenConfig::new("k".repeat(64))).unwrap();
        let hs256 = TokenService::new(
            TokenConfig::new("k".repeat(64)).with_algorithm(SigningAlgorithm::Hs256),
        )
        .unwrap();

        let token = hs512.issue("user@agency.test", Role::MarketingManager).unwrap();
        assert!(matches!(
            hs256.validate(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_empty_subject() {
        assert_eq!(
            service().issue("  ", Role::GeneralManager),
            Err(AuthError::EmptySubject)
        );
    }

    #[test]
    fn test_issuer_enforced() {
        let with_issuer =
            TokenService::new(TokenConfig::new(SECRET).with_issuer("tourgate")).unwrap();
        let without_issuer = service();

        let token = without_issuer.issue("user@agency.test", Role::GeneralManager).unwrap();
        assert!(with_issuer.validate(&token).is_err());

        let token = with_issuer.issue("user@agency.test", Role::GeneralManager).unwrap();
        assert!(with_issuer.validate(&token).is_ok());
    }

    #[test]
    fn test_ttl_from_millis() {
        let tokens =
            TokenService::new(TokenConfig::new(SECRET).with_ttl(Duration::from_millis(90_500)))
                .unwrap();
        assert_eq!(tokens.ttl_secs(), 90);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", TokenConfig::new(SECRET));
        assert!(!debug.contains(SECRET));
    }
}
