// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`GateLayer`]: token validation and rule-table authorization

mod gate;

pub use gate::{GateLayer, GateMiddleware};
