// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tourgate Integration Tests
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Secrets, users and configuration documents
//!   - `harness`: In-process HTTP harness over the axum router
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tourgate-tests
//!
//! cargo test -p tourgate-tests --test integration_token
//! cargo test -p tourgate-tests --test integration_gate
//! cargo test -p tourgate-tests --test integration_config
//! cargo test -p tourgate-tests --test integration_http
//! ```
//!
//! ## Test Categories
//!
//! - `integration_token.rs`: issue/validate, expiry, signature, algorithm and issuer checks
//! - `integration_gate.rs`: the default rule table against every role
//! - `integration_config.rs`: file loading, overrides and conversion into a running table
//! - `integration_http.rs`: login, role-gated routes and error bodies over HTTP
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use tourgate_tests::common::{init_test_logging, TestApp};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     init_test_logging();
//!     let app = TestApp::new();
//!     let token = app.token_for(Role::GeneralManager);
//!     let response = app.get("/api/admin/users", Some(&token)).await;
//! }
//! ```

pub mod common;
