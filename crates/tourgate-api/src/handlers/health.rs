// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::response::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Ready once a rule table is loaded.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let ready = !state.rules().is_empty();
    let body = ReadinessResponse {
        ready,
        rules: state.rules().len(),
        algorithm: state.tokens().algorithm().to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}
