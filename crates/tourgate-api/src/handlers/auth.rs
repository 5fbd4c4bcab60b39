// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::{Authenticated, ClientIp, RequestId};
use crate::response::{LoginResponse, MeResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "must not be empty");
        }
        if self.password.is_empty() {
            errors.add("password", "must not be empty");
        }
        errors.into_result(())
    }
}

/// POST /api/auth/login
///
/// Verifies credentials and returns a signed token.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let identity = match state.credentials().verify(&request.email, &request.password).await {
        Some(identity) => identity,
        None => {
            tracing::info!(
                email = %request.email,
                client_ip = ?client_ip,
                "Login rejected"
            );
            return Err(ApiError::unauthorized("invalid email or password"));
        }
    };

    let token = state.tokens().issue(&identity.subject, identity.role)?;

    tracing::info!(
        subject = %identity.subject,
        role = %identity.role,
        client_ip = ?client_ip,
        "Token issued"
    );

    Ok(Json(LoginResponse::new(
        token,
        state.tokens().ttl_secs(),
        identity,
    )))
}

// =============================================================================
// Current Identity
// =============================================================================

/// GET /api/auth/me
///
/// Returns the identity attached to the request.
pub async fn current_identity(
    Authenticated(identity): Authenticated,
    RequestId(request_id): RequestId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(MeResponse {
        subject: identity.subject,
        role: identity.role,
        request_id: request_id.to_string(),
    }))
}
