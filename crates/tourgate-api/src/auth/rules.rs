// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ordered path-pattern access rules.
//!
//! A [`RuleTable`] is a list of `(pattern, predicate)` pairs evaluated
//! top-to-bottom; the first pattern matching the request path decides which
//! predicate applies. Overlapping patterns are resolved by declaration order
//! only, never by specificity.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{AuthError, AuthResult, Identity, Role};

// =============================================================================
// PathPattern
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Exact segment.
    Literal(String),
    /// Segment containing `*` or `?`.
    Wildcard(Vec<char>),
    /// `**`: zero or more whole segments.
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str) -> AuthResult<Self> {
        if raw == "**" {
            return Ok(Self::AnyDepth);
        }
        if raw.contains("**") {
            return Err(AuthError::configuration(format!(
                "'**' must be a whole path segment, got '{}'",
                raw
            )));
        }
        if raw.contains(['*', '?']) {
            Ok(Self::Wildcard(raw.chars().collect()))
        } else {
            Ok(Self::Literal(raw.to_string()))
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == segment,
            Self::Wildcard(glob) => {
                let text: Vec<char> = segment.chars().collect();
                glob_match(glob, &text)
            }
            Self::AnyDepth => true,
        }
    }
}

/// Matches one segment against a `*`/`?` glob.
fn glob_match(glob: &[char], text: &[char]) -> bool {
    let (mut g, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match glob.get(g) {
            Some('*') => {
                star = Some((g, t));
                g += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                g += 1;
                t += 1;
            }
            _ => match star {
                Some((sg, st)) => {
                    g = sg + 1;
                    t = st + 1;
                    star = Some((sg, st + 1));
                }
                None => return false,
            },
        }
    }

    glob[g..].iter().all(|&c| c == '*')
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// An Ant-style path pattern.
///
/// - `?` matches one character within a segment
/// - `*` matches zero or more characters within a segment
/// - `**` matches zero or more whole segments, so `/api/admin/**` also
///   matches `/api/admin` itself
///
/// Empty segments are ignored on both sides, so trailing slashes do not
/// change the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern. It must start with `/`.
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(AuthError::configuration(format!(
                "path pattern must start with '/', got '{}'",
                raw
            )));
        }

        let mut segments: Vec<Segment> = Vec::new();
        for part in split_path(raw) {
            let segment = Segment::parse(part)?;
            // Collapse `/**/**` into a single `**`.
            if segment == Segment::AnyDepth && segments.last() == Some(&Segment::AnyDepth) {
                continue;
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns `true` if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match_segments(&self.segments, &split_path(path))
    }

    /// Returns `true` if the pattern matches every path.
    pub fn is_catch_all(&self) -> bool {
        self.segments == [Segment::AnyDepth]
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// RolePredicate
// =============================================================================

/// Who may reach the paths a rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", content = "roles", rename_all = "snake_case")]
pub enum RolePredicate {
    /// Anyone, with or without a credential.
    Public,
    /// Any validated identity.
    Authenticated,
    /// Exactly this role.
    Role(Role),
    /// Any role in the set.
    AnyRole(Vec<Role>),
}

impl RolePredicate {
    /// Creates a role-set predicate, rejecting an empty set.
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> AuthResult<Self> {
        let mut roles: Vec<Role> = roles.into_iter().collect();
        roles.sort();
        roles.dedup();

        if roles.is_empty() {
            return Err(AuthError::configuration("role set must not be empty"));
        }
        Ok(Self::AnyRole(roles))
    }

    /// Returns `true` if this predicate lets requests through without a token.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Returns `true` if `identity` satisfies the predicate.
    pub fn permits(&self, identity: &Identity) -> bool {
        match self {
            Self::Public | Self::Authenticated => true,
            Self::Role(role) => identity.has_role(*role),
            Self::AnyRole(roles) => identity.has_any_role(roles),
        }
    }

    fn check(&self) -> AuthResult<()> {
        match self {
            Self::AnyRole(roles) if roles.is_empty() => {
                Err(AuthError::configuration("role set must not be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RolePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Role(role) => write!(f, "role({})", role),
            Self::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "any_role({})", names.join(", "))
            }
        }
    }
}

// =============================================================================
// AccessRule
// =============================================================================

/// One `(pattern, predicate)` entry of the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// The compiled path pattern.
    pub pattern: PathPattern,
    /// The predicate applied when the pattern matches.
    pub predicate: RolePredicate,
}

impl AccessRule {
    /// Compiles a rule.
    pub fn new(pattern: &str, predicate: RolePredicate) -> AuthResult<Self> {
        predicate.check().map_err(|e| match e {
            AuthError::Configuration { message } => {
                AuthError::configuration(format!("rule '{}': {}", pattern, message))
            }
            other => other,
        })?;

        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            predicate,
        })
    }

    /// Returns `true` if the rule's pattern matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pattern, self.predicate)
    }
}

// =============================================================================
// RuleTable
// =============================================================================

/// A problem found in a rule table that does not prevent startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleWarning {
    /// The rule can never be selected because an earlier rule covers it.
    Unreachable {
        /// Position of the dead rule.
        index: usize,
        /// Its pattern.
        pattern: String,
        /// Pattern of the earlier rule that shadows it.
        shadowed_by: String,
    },
    /// The table does not end in `/**`; unmatched paths fall to default deny.
    NoCatchAll,
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable {
                index,
                pattern,
                shadowed_by,
            } => write!(
                f,
                "rule #{} '{}' is unreachable, shadowed by '{}'",
                index, pattern, shadowed_by
            ),
            Self::NoCatchAll => f.write_str(
                "rule table has no '/**' catch-all; unmatched paths are denied",
            ),
        }
    }
}

/// Immutable, ordered access rule table.
///
/// Built once at startup and shared across requests.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Arc<[AccessRule]>,
}

impl RuleTable {
    /// Creates a table builder.
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::new()
    }

    /// Creates a table from already compiled rules.
    pub fn from_rules(rules: Vec<AccessRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// The rule table shipped with the agency backend.
    ///
    /// Health endpoints first, then the agency's public and role-gated prefixes
    /// in their original order, then an authenticated catch-all.
    pub fn default_table() -> AuthResult<Self> {
        Self::builder()
            .public(["/health", "/ready"])
            .public([
                "/api/auth/**",
                "/api/payments/**",
                "/api/promotions/**",
                "/api/packages/**",
                "/api/guides/**",
                "/api/availability/**",
                "/api/reports/**",
            ])
            .public([
                "/api/manager/dashboard/**",
                "/api/clients/**",
                "/api/adminmanagement/**",
            ])
            .role(["/api/consultant/**"], Role::SeniorTravelConsultant)
            .role(
                ["/api/customer-service/**", "/api/reservations/**"],
                Role::CustomerServiceExecutive,
            )
            .role(["/api/marketing/**"], Role::MarketingManager)
            .any_role(["/api/admin/**"], Role::ALL)
            .authenticated(["/**"])
            .build()
    }

    /// Returns the first rule matching `path` and its position.
    pub fn evaluate(&self, path: &str) -> Option<(usize, &AccessRule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(path))
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finds rules that can never be selected and a missing catch-all.
    pub fn diagnostics(&self) -> Vec<RuleWarning> {
        let mut warnings = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let shadow = self.rules[..index]
                .iter()
                .find(|earlier| earlier.pattern.is_catch_all() || earlier.pattern == rule.pattern);

            if let Some(earlier) = shadow {
                warnings.push(RuleWarning::Unreachable {
                    index,
                    pattern: rule.pattern.to_string(),
                    shadowed_by: earlier.pattern.to_string(),
                });
            }
        }

        if !self.rules.iter().any(|r| r.pattern.is_catch_all()) {
            warnings.push(RuleWarning::NoCatchAll);
        }

        warnings
    }

    /// Logs the table and its diagnostics.
    pub fn log_summary(&self) {
        tracing::info!(rules = self.rules.len(), "Access rule table loaded");
        for (index, rule) in self.rules.iter().enumerate() {
            tracing::debug!(index, rule = %rule, "Access rule");
        }
        for warning in self.diagnostics() {
            tracing::warn!("{}", warning);
        }
    }
}

// =============================================================================
// RuleTableBuilder
// =============================================================================

/// Builder for [`RuleTable`]. Patterns are compiled on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    entries: Vec<(String, RolePredicate)>,
}

impl RuleTableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one rule.
    pub fn rule(mut self, pattern: impl Into<String>, predicate: RolePredicate) -> Self {
        self.entries.push((pattern.into(), predicate));
        self
    }

    /// Appends one rule per pattern, all sharing `predicate`.
    pub fn rules<I, S>(mut self, patterns: I, predicate: RolePredicate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            self.entries.push((pattern.into(), predicate.clone()));
        }
        self
    }

    /// Appends public rules.
    pub fn public<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules(patterns, RolePredicate::Public)
    }

    /// Appends rules requiring any validated identity.
    pub fn authenticated<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules(patterns, RolePredicate::Authenticated)
    }

    /// Appends rules requiring exactly `role`.
    pub fn role<I, S>(self, patterns: I, role: Role) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules(patterns, RolePredicate::Role(role))
    }

    /// Appends rules requiring any of `roles`.
    pub fn any_role<I, S, R>(self, patterns: I, roles: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Role>,
    {
        let mut roles: Vec<Role> = roles.into_iter().collect();
        roles.sort();
        roles.dedup();
        self.rules(patterns, RolePredicate::AnyRole(roles))
    }

    /// Compiles every rule, failing on the first malformed one.
    pub fn build(self) -> AuthResult<RuleTable> {
        let rules = self
            .entries
            .into_iter()
            .map(|(pattern, predicate)| AccessRule::new(&pattern, predicate))
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(RuleTable::from_rules(rules))
    }
}

// =============================================================================
// Tests
// =============================================================================
