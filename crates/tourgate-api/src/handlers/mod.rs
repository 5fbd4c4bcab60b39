// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.
//!
//! - [`health`]: liveness and readiness probes
//! - [`auth`]: login and current identity

mod auth;
mod health;

pub use auth::*;
pub use health::*;
