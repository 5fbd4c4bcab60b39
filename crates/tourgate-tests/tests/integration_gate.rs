// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Access Gate Integration Tests
//!
//! Exercises [`AccessGate::intercept`] against the default rule table and
//! hand-built tables.

use std::sync::Arc;

use tourgate_api::auth::RuleWarning;
use tourgate_api::{
    AccessGate, GateDecision, Identity, Rejection, Role, RolePredicate, RuleTable, TokenConfig,
};
use tourgate_tests::common::{init_test_logging, TokenFixtures, UserFixtures, OTHER_SECRET};

// =============================================================================
// Helpers
// =============================================================================

fn default_gate() -> AccessGate {
    gate_with(RuleTable::default_table().unwrap())
}

fn gate_with(rules: RuleTable) -> AccessGate {
    AccessGate::new(Arc::new(TokenFixtures::service()), Arc::new(rules))
}

fn bearer(gate: &AccessGate, role: Role) -> String {
    let token = gate
        .tokens()
        .issue(UserFixtures::email_for(role), role)
        .unwrap();
    format!("Bearer {}", token)
}

fn decide(gate: &AccessGate, path: &str, role: Option<Role>) -> GateDecision {
    let header = role.map(|role| bearer(gate, role));
    gate.intercept(path, header.as_deref())
}

// =============================================================================
// Default Table
// =============================================================================

const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/ready",
    "/api/auth/login",
    "/api/auth",
    "/api/payments/checkout",
    "/api/promotions",
    "/api/packages/12/itinerary",
    "/api/guides/7",
    "/api/availability/2025-06",
    "/api/reports/monthly",
    "/api/manager/dashboard/stats",
    "/api/clients/42",
    "/api/adminmanagement/users",
];

#[test]
fn test_gate_public_paths_allow_anonymous() {
    init_test_logging();
    let gate = default_gate();

    for path in PUBLIC_PATHS {
        assert_eq!(
            gate.intercept(path, None),
            GateDecision::Proceed(None),
            "{}",
            path
        );
    }
}

#[test]
fn test_gate_public_paths_attach_valid_identity() {
    let gate = default_gate();

    for path in PUBLIC_PATHS {
        let decision = decide(&gate, path, Some(Role::MarketingManager));
        assert_eq!(
            decision,
            GateDecision::Proceed(Some(Identity::new(
                UserFixtures::email_for(Role::MarketingManager),
                Role::MarketingManager
            )))
        );
    }
}

#[test]
fn test_gate_role_matrix() {
    let gate = default_gate();
    let cases = [
        ("/api/consultant/tours", Role::SeniorTravelConsultant),
        ("/api/customer-service/tickets/3", Role::CustomerServiceExecutive),
        ("/api/reservations/99", Role::CustomerServiceExecutive),
        ("/api/marketing/campaigns", Role::MarketingManager),
    ];

    for (path, owner) in cases {
        assert_eq!(
            decide(&gate, path, None),
            GateDecision::Reject(Rejection::MissingCredential),
            "{} anonymous",
            path
        );

        for role in Role::ALL {
            let decision = decide(&gate, path, Some(role));
            if role == owner {
                assert!(decision.is_proceed(), "{} as {}", path, role);
            } else {
                assert_eq!(
                    decision,
                    GateDecision::Reject(Rejection::Forbidden),
                    "{} as {}",
                    path,
                    role
                );
            }
        }
    }
}

#[test]
fn test_gate_roles_are_flat() {
    let gate = default_gate();

    // General manager gets no implicit access to other roles' prefixes.
    for path in ["/api/consultant/x", "/api/reservations/x", "/api/marketing/x"] {
        assert_eq!(
            decide(&gate, path, Some(Role::GeneralManager)),
            GateDecision::Reject(Rejection::Forbidden)
        );
    }
}

#[test]
fn test_gate_percent_encoded_path_keeps_role_rule() {
    let gate = default_gate();

    for path in [
        "/api/%63onsultant/trips",
        "/api/consultan%74/trips",
        "/%61pi/consultant/trips",
        "/api/%72eservations/7",
    ] {
        assert_eq!(
            decide(&gate, path, Some(Role::GeneralManager)),
            GateDecision::Reject(Rejection::Forbidden),
            "{}",
            path
        );
    }

    let identity = decide(&gate, "/api/%63onsultant/trips", Some(Role::SeniorTravelConsultant))
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(identity.role, Role::SeniorTravelConsultant);
}

#[test]
fn test_gate_malformed_path_is_unauthorized() {
    let gate = default_gate();

    for path in [
        "/api/auth%2F..%2Fconsultant/trips",
        "/api/auth/%2e%2e/consultant/trips",
        "/api/packages/%zz",
        "/api/packages/%252e%252e",
    ] {
        for role in [None, Some(Role::SeniorTravelConsultant)] {
            let decision = decide(&gate, path, role);
            assert_eq!(decision, GateDecision::Reject(Rejection::MalformedPath), "{}", path);
            assert!(decision.into_result().unwrap_err().is_unauthorized());
        }
    }
}

#[test]
fn test_gate_admin_prefix_any_role() {
    let gate = default_gate();

    for role in Role::ALL {
        assert!(decide(&gate, "/api/admin/users", Some(role)).is_proceed());
    }
    assert_eq!(
        decide(&gate, "/api/admin/users", None),
        GateDecision::Reject(Rejection::MissingCredential)
    );
}

#[test]
fn test_gate_catch_all_requires_authentication() {
    let gate = default_gate();

    for path in ["/", "/api/bookings", "/api/administrator", "/apis/auth/login"] {
        assert_eq!(
            decide(&gate, path, None),
            GateDecision::Reject(Rejection::MissingCredential),
            "{}",
            path
        );
        assert!(decide(&gate, path, Some(Role::SeniorTravelConsultant)).is_proceed());
    }
}

#[test]
fn test_gate_invalid_credential_on_public_path() {
    let gate = default_gate();

    for header in ["Bearer junk", "Basic dXNlcjpwYXNz", "Bearer", "Bearer    "] {
        let decision = gate.intercept("/api/auth/login", Some(header));
        assert!(
            matches!(decision, GateDecision::Reject(Rejection::InvalidCredential(_))),
            "{:?}",
            header
        );
    }
}

#[test]
fn test_gate_foreign_token_is_invalid_not_forbidden() {
    let gate = default_gate();
    let foreign = TokenFixtures::service_with(TokenConfig::new(OTHER_SECRET))
        .issue("gm@agency.test", Role::GeneralManager)
        .unwrap();

    let decision = gate.intercept("/api/consultant/x", Some(&format!("Bearer {}", foreign)));
    match decision {
        GateDecision::Reject(rejection) => {
            assert!(rejection.is_unauthorized());
            assert!(!rejection.is_forbidden());
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[test]
fn test_gate_scheme_is_case_insensitive() {
    let gate = default_gate();
    let token = gate.tokens().issue("gm@agency.test", Role::GeneralManager).unwrap();

    for scheme in ["bearer", "BEARER", "Bearer"] {
        let header = format!("{} {}", scheme, token);
        assert!(gate.intercept("/api/admin/x", Some(&header)).is_proceed());
    }
}

#[test]
fn test_gate_decision_is_deterministic() {
    let gate = default_gate();
    let header = bearer(&gate, Role::CustomerServiceExecutive);

    let first = gate.intercept("/api/reservations/1", Some(&header));
    for _ in 0..10 {
        assert_eq!(gate.intercept("/api/reservations/1", Some(&header)), first);
    }
}

// =============================================================================
// Custom Tables
// =============================================================================

#[test]
fn test_gate_first_match_wins() {
    let rules = RuleTable::builder()
        .public(["/api/reports/**"])
        .role(["/api/reports/finance/**"], Role::GeneralManager)
        .authenticated(["/**"])
        .build()
        .unwrap();
    let gate = gate_with(rules);

    // The earlier public rule shadows the later, narrower role rule.
    assert_eq!(
        gate.intercept("/api/reports/finance/q3", None),
        GateDecision::Proceed(None)
    );
}

#[test]
fn test_gate_no_matching_rule_denies() {
    let rules = RuleTable::builder()
        .public(["/health"])
        .build()
        .unwrap();
    let gate = gate_with(rules);

    assert_eq!(
        decide(&gate, "/api/anything", Some(Role::GeneralManager)),
        GateDecision::Reject(Rejection::NoMatchingRule)
    );

    let empty = gate_with(RuleTable::from_rules(Vec::new()));
    assert_eq!(
        empty.intercept("/health", None),
        GateDecision::Reject(Rejection::NoMatchingRule)
    );
}

#[test]
fn test_gate_any_role_predicate() {
    let rules = RuleTable::builder()
        .any_role(["/api/admin/**"], [Role::GeneralManager, Role::MarketingManager])
        .build()
        .unwrap();
    let gate = gate_with(rules);

    assert!(decide(&gate, "/api/admin/x", Some(Role::GeneralManager)).is_proceed());
    assert!(decide(&gate, "/api/admin/x", Some(Role::MarketingManager)).is_proceed());
    assert_eq!(
        decide(&gate, "/api/admin/x", Some(Role::SeniorTravelConsultant)),
        GateDecision::Reject(Rejection::Forbidden)
    );
}

#[test]
fn test_rule_table_empty_role_set_rejected() {
    assert!(RolePredicate::any_of(Vec::new()).is_err());
    assert!(RuleTable::builder()
        .any_role(["/api/admin/**"], Vec::new())
        .build()
        .is_err());
}

#[test]
fn test_rule_table_malformed_pattern_rejected() {
    assert!(RuleTable::builder().public(["api/no-slash"]).build().is_err());
    assert!(RuleTable::builder().public(["/api/a**b"]).build().is_err());
}

#[test]
fn test_rule_table_diagnostics() {
    assert!(RuleTable::default_table().unwrap().diagnostics().is_empty());

    let rules = RuleTable::builder()
        .authenticated(["/**"])
        .public(["/health"])
        .build()
        .unwrap();
    let warnings = rules.diagnostics();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        RuleWarning::Unreachable { index: 1, .. }
    ));

    let rules = RuleTable::builder().public(["/health"]).build().unwrap();
    assert_eq!(rules.diagnostics(), vec![RuleWarning::NoCatchAll]);
}
