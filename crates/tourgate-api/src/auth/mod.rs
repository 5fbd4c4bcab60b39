// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Token issuance and validation
//! - The ordered path-pattern rule table
//! - The per-request access gate
//! - Authentication context

mod claims;
mod context;
mod error;
mod gate;
mod role;
mod rules;
mod token;

pub use claims::Claims;
pub use context::{AuthContext, Identity};
pub use error::{AuthError, AuthResult};
pub use gate::{bearer_token, decode_path, AccessGate, GateDecision, Rejection, BEARER_SCHEME};
pub use role::Role;
pub use rules::{AccessRule, PathPattern, RolePredicate, RuleTable, RuleTableBuilder, RuleWarning};
pub use token::{SigningAlgorithm, TokenConfig, TokenService, MIN_SECRET_LEN, MIN_TTL};
