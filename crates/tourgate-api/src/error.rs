// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Maps errors to HTTP status codes and JSON error bodies. Authentication
//! failures of any kind render the same 401 body; the cause is only logged.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthError, Rejection};

/// Result of a handler or server operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned with every 401.
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication required";

/// Message returned with every 403.
pub const FORBIDDEN_MESSAGE: &str = "Access denied";

// =============================================================================
// ApiError
// =============================================================================

/// Failure surfaced to an HTTP client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route for the path.
    #[error("no route for {resource}")]
    NotFound {
        /// Requested path.
        resource: String,
    },

    /// Unreadable request body.
    #[error("malformed request: {message}")]
    BadRequest {
        /// Shown to the client.
        message: String,
    },

    /// Missing, malformed or rejected credential.
    #[error("unauthenticated: {message}")]
    Unauthorized {
        /// Internal cause; not shown to the client.
        message: String,
    },

    /// Authenticated caller without a permitted role.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Internal cause; not shown to the client.
        message: String,
    },

    /// Well-formed body with invalid fields.
    #[error("invalid request: {message}")]
    Validation {
        /// Summary.
        message: String,
        /// Per-field problems.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Server-side failure. Details stay in the logs.
    #[error("internal failure: {message}")]
    Internal {
        /// Logged, never returned.
        message: String,
    },
}

impl ApiError {
    /// 404 for `resource`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 400 with a client-visible message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// 401; `cause` is only logged.
    pub fn unauthorized(cause: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: cause.into(),
        }
    }

    /// 403; `cause` is only logged.
    pub fn forbidden(cause: impl Into<String>) -> Self {
        Self::Forbidden {
            message: cause.into(),
        }
    }

    /// 422 carrying per-field problems.
    pub fn invalid_fields(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// 500; `cause` is only logged.
    pub fn internal(cause: impl Into<String>) -> Self {
        Self::Internal {
            message: cause.into(),
        }
    }

    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// HTTP status of the response.
    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    /// Stable machine-readable code placed in `error.code`.
    pub fn error_code(&self) -> &'static str {
        self.classify().1
    }

    /// The `error.message` text. Never includes an auth failure's cause.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource } => format!("{} not found", resource),
            Self::BadRequest { message } => message.clone(),
            Self::Unauthorized { .. } => UNAUTHORIZED_MESSAGE.to_string(),
            Self::Forbidden { .. } => FORBIDDEN_MESSAGE.to_string(),
            Self::Validation { message, .. } => format!("Validation failed: {}", message),
            Self::Internal { .. } => "Internal server error".to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        match self {
            Self::Internal { .. } => {
                tracing::error!(error = %self, code, status = status.as_u16(), "Request failed")
            }
            _ => tracing::debug!(error = %self, code, status = status.as_u16(), "Request rejected"),
        }

        let body = ErrorBody {
            error: ErrorPayload {
                code: code.to_string(),
                message: self.user_message(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Wire shape: `{ "error": { code, message, details? } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error.
    pub error: ErrorPayload,
}

/// Contents of [`ErrorBody`].
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// See [`ApiError::error_code`].
    pub code: String,
    /// See [`ApiError::user_message`].
    pub message: String,
    /// Field errors on 422.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Field problems collected while checking a request body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// In the order they were found.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem with `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` when empty, otherwise a 422.
    pub fn into_result<T>(self, value: T) -> ApiResult<T> {
        if self.fields.is_empty() {
            return Ok(value);
        }
        let names: Vec<&str> = self.fields.iter().map(|f| f.field.as_str()).collect();
        let message = names.join(", ");
        Err(ApiError::invalid_fields(message, self))
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} invalid field(s)", self.fields.len())
    }
}

/// One invalid field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// Conversions
// =============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptySubject => ApiError::bad_request(err.to_string()),
            AuthError::Configuration { message } => ApiError::internal(message),
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        if rejection.is_forbidden() {
            ApiError::forbidden(rejection.to_string())
        } else {
            ApiError::unauthorized(rejection.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text()))
    }
}

// =============================================================================
// Tests
// =============================================================================
