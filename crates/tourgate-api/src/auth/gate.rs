// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The access decision for a single request.
//!
//! [`AccessGate::intercept`] looks only at the request path and the raw
//! `Authorization` header value. It never touches the transport, so the tower
//! middleware in [`crate::middleware`] is a thin adapter around it.
//!
//! Rules are matched against the percent-decoded path, so `/api/%63onsultant`
//! is gated exactly like `/api/consultant`. Paths that cannot be decoded into
//! plain segments are refused before any rule is consulted.

use std::fmt;
use std::sync::Arc;

use super::{AuthError, Identity, RolePredicate, RuleTable, TokenService};

/// Authorization scheme accepted in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

// =============================================================================
// Rejection
// =============================================================================

/// Why a request was turned away.
///
/// Everything except [`Rejection::Forbidden`] is reported to the client as
/// the same 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Non-public path reached without an `Authorization` header.
    MissingCredential,
    /// A credential was presented but did not validate.
    InvalidCredential(AuthError),
    /// The path has a bad escape, an encoded separator or a dot segment.
    MalformedPath,
    /// No rule matched the path.
    NoMatchingRule,
    /// The identity's role does not satisfy the matched rule.
    Forbidden,
}

impl Rejection {
    /// Returns `true` for the 403 outcome.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// Returns `true` for any 401 outcome.
    pub fn is_unauthorized(&self) -> bool {
        !self.is_forbidden()
    }

    /// Short label for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential(err) => err.kind(),
            Self::MalformedPath => "malformed_path",
            Self::NoMatchingRule => "no_matching_rule",
            Self::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => f.write_str("missing credential"),
            Self::InvalidCredential(err) => write!(f, "invalid credential: {}", err),
            Self::MalformedPath => f.write_str("path is not in canonical form"),
            Self::NoMatchingRule => f.write_str("no access rule matches the path"),
            Self::Forbidden => f.write_str("role not permitted"),
        }
    }
}

// =============================================================================
// GateDecision
// =============================================================================

/// Outcome of [`AccessGate::intercept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through, with the caller's identity if one was presented.
    Proceed(Option<Identity>),
    /// Stop the request.
    Reject(Rejection),
}

impl GateDecision {
    /// Returns `true` if the request may proceed.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }

    /// Converts the decision into a `Result`.
    pub fn into_result(self) -> Result<Option<Identity>, Rejection> {
        match self {
            Self::Proceed(identity) => Ok(identity),
            Self::Reject(rejection) => Err(rejection),
        }
    }
}

// =============================================================================
// AccessGate
// =============================================================================

/// Validates credentials and applies the rule table.
///
/// Cheap to clone; the token service and rule table are shared.
#[derive(Debug, Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    rules: Arc<RuleTable>,
}

impl AccessGate {
    /// Creates a gate.
    pub fn new(tokens: Arc<TokenService>, rules: Arc<RuleTable>) -> Self {
        Self { tokens, rules }
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Returns the rule table.
    pub fn rules(&self) -> &Arc<RuleTable> {
        &self.rules
    }

    /// Decides whether a request for `path` carrying `authorization` proceeds.
    ///
    /// `path` is the raw request path; it is decoded here before matching.
    pub fn intercept(&self, path: &str, authorization: Option<&str>) -> GateDecision {
        let path = match decode_path(path) {
            Some(path) => path,
            None => return GateDecision::Reject(Rejection::MalformedPath),
        };

        let predicate = match self.rules.evaluate(&path) {
            Some((_, rule)) => &rule.predicate,
            None => return GateDecision::Reject(Rejection::NoMatchingRule),
        };

        // A present credential is always validated, even on public paths.
        let identity = match authorization {
            Some(header) => match self.authenticate(header) {
                Ok(identity) => Some(identity),
                Err(err) => return GateDecision::Reject(Rejection::InvalidCredential(err)),
            },
            None => None,
        };

        self.authorize(predicate, identity)
    }

    fn authenticate(&self, header: &str) -> Result<Identity, AuthError> {
        let token = bearer_token(header)
            .ok_or_else(|| AuthError::invalid_token("malformed authorization header"))?;
        self.tokens.validate(token)
    }

    fn authorize(&self, predicate: &RolePredicate, identity: Option<Identity>) -> GateDecision {
        match identity {
            None if predicate.is_public() => GateDecision::Proceed(None),
            None => GateDecision::Reject(Rejection::MissingCredential),
            Some(identity) if predicate.permits(&identity) => {
                GateDecision::Proceed(Some(identity))
            }
            Some(_) => GateDecision::Reject(Rejection::Forbidden),
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` when the scheme
/// differs or the token is empty.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Percent-decodes each segment of a raw request path.
///
/// Empty segments are dropped. Returns `None` for an invalid escape or
/// invalid UTF-8, for `.` and `..` segments, and for a segment that decodes
/// to something containing `/`, `\`, `%` or `;`.
pub fn decode_path(path: &str) -> Option<String> {
    let mut decoded = String::with_capacity(path.len());

    for raw in path.split('/').filter(|s| !s.is_empty()) {
        if !has_valid_escapes(raw) {
            return None;
        }
        let segment = urlencoding::decode(raw).ok()?;
        if segment == "." || segment == ".." || segment.contains(['/', '\\', '%', ';']) {
            return None;
        }
        decoded.push('/');
        decoded.push_str(&segment);
    }

    if decoded.is_empty() {
        decoded.push('/');
    }
    Some(decoded)
}

/// Every `%` must start a two-digit hex escape.
fn has_valid_escapes(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
            _ => return false,
        }
    }
    true
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenConfig};

    const SECRET: &str = "gate-test-secret-that-is-long-enough!!";

    fn gate() -> AccessGate {
        let tokens = TokenService::new(TokenConfig::new(SECRET)).unwrap();
        let rules = RuleTable::builder()
            .public(["/api/auth/**"])
            .role(["/api/consultant/**"], Role::SeniorTravelConsultant)
            .any_role(
                ["/api/admin/**"],
                [Role::GeneralManager, Role::MarketingManager],
            )
            .authenticated(["/api/**"])
            .build()
            .unwrap();
        AccessGate::new(Arc::new(tokens), Arc::new(rules))
    }

    fn bearer(gate: &AccessGate, role: Role) -> String {
        format!("Bearer {}", gate.tokens().issue("user@agency.test", role).unwrap())
    }

    #[test]
    fn test_public_without_credential() {
        assert_eq!(gate().intercept("/api/auth/login", None), GateDecision::Proceed(None));
    }

    #[test]
    fn test_public_with_malformed_credential() {
        let gate = gate();

        for header in ["Bearer not-a-token", "Basic dXNlcjpwYXNz", "Bearer ", "garbage"] {
            let decision = gate.intercept("/api/auth/login", Some(header));
            assert!(
                matches!(decision, GateDecision::Reject(Rejection::InvalidCredential(_))),
                "{} -> {:?}",
                header,
                decision
            );
        }
    }

    #[test]
    fn test_public_with_valid_credential_attaches_identity() {
        let gate = gate();
        let header = bearer(&gate, Role::MarketingManager);

        let identity = gate.intercept("/api/auth/me", Some(&header)).into_result().unwrap();
        assert_eq!(identity.unwrap().role, Role::MarketingManager);
    }

    #[test]
    fn test_missing_credential() {
        assert_eq!(
            gate().intercept("/api/bookings", None),
            GateDecision::Reject(Rejection::MissingCredential)
        );
    }

    #[test]
    fn test_exact_role() {
        let gate = gate();

        let ok = bearer(&gate, Role::SeniorTravelConsultant);
        assert!(gate.intercept("/api/consultant/trips", Some(&ok)).is_proceed());

        let wrong = bearer(&gate, Role::GeneralManager);
        assert_eq!(
            gate.intercept("/api/consultant/trips", Some(&wrong)),
            GateDecision::Reject(Rejection::Forbidden)
        );
    }

    #[test]
    fn test_role_set() {
        let gate = gate();

        for role in Role::ALL {
            let header = bearer(&gate, role);
            let decision = gate.intercept("/api/admin/users", Some(&header));
            let expected = matches!(role, Role::GeneralManager | Role::MarketingManager);

            if expected {
                assert!(decision.is_proceed(), "{} should pass", role);
            } else {
                assert_eq!(decision, GateDecision::Reject(Rejection::Forbidden));
            }
        }
    }

    #[test]
    fn test_default_deny() {
        assert_eq!(
            gate().intercept("/other", None),
            GateDecision::Reject(Rejection::NoMatchingRule)
        );
    }

    #[test]
    fn test_encoded_path_is_gated_like_plain() {
        let gate = gate();
        let wrong = bearer(&gate, Role::GeneralManager);
        let ok = bearer(&gate, Role::SeniorTravelConsultant);

        for path in ["/api/%63onsultant/trips", "/api/consultant/%74rips", "/api/CONSULTANT/trips"] {
            let expected_forbidden = path != "/api/CONSULTANT/trips";
            let decision = gate.intercept(path, Some(&wrong));
            assert_eq!(
                decision == GateDecision::Reject(Rejection::Forbidden),
                expected_forbidden,
                "{} -> {:?}",
                path,
                decision
            );
        }

        assert!(gate.intercept("/api/%63onsultant/trips", Some(&ok)).is_proceed());
    }

    #[test]
    fn test_malformed_path_rejected() {
        let gate = gate();
        let header = bearer(&gate, Role::SeniorTravelConsultant);

        for path in [
            "/api/consultant%2Ftrips",
            "/api/auth/%2e%2e/consultant/trips",
            "/api/auth/../consultant/trips",
            "/api/auth/%zz",
            "/api/auth/%c3%28",
            "/api/auth/%252Fx",
            "/api/auth;jsessionid=1/login",
        ] {
            assert_eq!(
                gate.intercept(path, Some(&header)),
                GateDecision::Reject(Rejection::MalformedPath),
                "{}",
                path
            );
        }
        assert!(Rejection::MalformedPath.is_unauthorized());
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/api/%63onsultant/trips").as_deref(), Some("/api/consultant/trips"));
        assert_eq!(decode_path("//api///auth/").as_deref(), Some("/api/auth"));
        assert_eq!(decode_path("/").as_deref(), Some("/"));
        assert_eq!(decode_path("/files/a%20b").as_deref(), Some("/files/a b"));
        assert_eq!(decode_path("/api/%2F"), None);
        assert_eq!(decode_path("/api/%5C"), None);
        assert_eq!(decode_path("/api/%"), None);
        assert_eq!(decode_path("/api/./x"), None);
    }

    #[test]
    fn test_rejection_classes() {
        assert!(Rejection::Forbidden.is_forbidden());
        assert!(Rejection::MissingCredential.is_unauthorized());
        assert!(Rejection::NoMatchingRule.is_unauthorized());
        assert!(Rejection::InvalidCredential(AuthError::Expired).is_unauthorized());
        assert_eq!(Rejection::InvalidCredential(AuthError::Signature).reason(), "signature");
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer  "), None);
        assert_eq!(bearer_token("Token abc"), None);
        assert_eq!(bearer_token(""), None);
    }
}
