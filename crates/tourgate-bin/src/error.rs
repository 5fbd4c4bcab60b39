// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary-level errors and process exit codes.
//!
//! | code | cause |
//! |------|-------|
//! | 1 | invalid configuration (file, token settings, rules, users) |
//! | 2 | logging or signal setup failed |
//! | 3 | command failed at runtime |
//! | 4 | I/O |
//! | 6 | HTTP server |
//! | 7 | token operation |

use thiserror::Error;

/// Result of a CLI operation.
pub type BinResult<T> = Result<T, BinError>;

/// Failure of a `tourgate` command.
#[derive(Debug, Error)]
pub enum BinError {
    /// Settings rejected after loading.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Process setup failed before serving.
    #[error("startup failed: {0}")]
    Initialization(String),

    /// Command failed while running.
    #[error("{0}")]
    Runtime(String),

    /// Filesystem or socket failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP server failure.
    #[error(transparent)]
    Api(#[from] tourgate_api::ApiError),

    /// Config file could not be loaded.
    #[error(transparent)]
    Config(#[from] tourgate_config::ConfigError),

    /// Token service or rule table rejected its input.
    #[error(transparent)]
    Auth(#[from] tourgate_api::AuthError),

    /// Another error, prefixed with where it happened.
    #[error("{context}: {source}")]
    WithContext {
        /// Where it happened, e.g. `users[2].role`.
        context: String,
        /// What happened.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Invalid configuration.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Startup failure.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Prefixes the error with `context`.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Process exit code; see the module table.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Auth(err) if err.is_configuration() => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Api(_) => 6,
            Self::Auth(_) => 7,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Prints `error` and each of its causes to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("error: {}", error);

    let mut cause = std::error::Error::source(error);
    while let Some(err) = cause {
        eprintln!("  caused by: {}", err);
        cause = err.source();
    }
}

/// Prints `error` and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}
