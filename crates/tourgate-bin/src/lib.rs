// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tourgate-bin
//!
//! The `tourgate` command: loads a config file, turns it into a token
//! service, rule table and user directory, and serves them over HTTP until a
//! signal arrives.
//!
//! ## Flow
//!
//! ```text
//! main ─► cli::Cli ─► commands::execute
//!                          │
//!          ConfigLoader ◄──┤──► logging::init_logging
//!                          ▼
//!               runtime::Components::from_config
//!                          │
//!                          ▼
//!   GatewayRuntime::run ─► ApiServer ◄── ShutdownCoordinator (SIGTERM/SIGINT)
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serve with ./tourgate.yaml
//! tourgate
//!
//! # Serve on another port with a different file
//! tourgate -c /etc/tourgate/prod.yaml run --port 9000
//!
//! # Check a file and print it back with secrets removed
//! tourgate validate --show-config --format json
//!
//! # Mint a token for manual testing
//! tourgate issue-token --subject gm@agency.test --role GENERAL_MANAGER
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{Components, GatewayRuntime, RuntimeBuilder};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
