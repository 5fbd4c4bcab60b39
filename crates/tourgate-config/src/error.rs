// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while reading, parsing, overriding or validating a config file.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML, TOML or JSON, or does not fit the schema.
    #[error("cannot parse '{path}': {message}")]
    Parse {
        /// Source file; `<string>` for in-memory documents.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A value is out of range or inconsistent.
    #[error("{field}: {message}")]
    Validation {
        /// Dotted path, e.g. `security.rules[3].roles`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The file exists but could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Source file.
        path: PathBuf,
        /// OS error.
        #[source]
        source: std::io::Error,
    },

    /// No file at the given path.
    #[error("config file '{path}' does not exist")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// A `TOURGATE_*` override could not be applied.
    #[error("environment override {name}: {message}")]
    InvalidEnvVar {
        /// Variable name including the prefix.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// File extension is not `.yaml`, `.yml`, `.toml` or `.json`.
    #[error("unsupported config format '{format}'")]
    UnsupportedFormat {
        /// The extension found.
        format: String,
    },

    /// Intermediate conversion between formats failed.
    #[error("cannot convert document: {message}")]
    Serialization {
        /// Serializer message.
        message: String,
    },
}

impl ConfigError {
    /// Parse failure in `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Invalid value at `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Read failure for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing file.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Rejected override in variable `name`.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unknown extension.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Conversion failure.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// `true` for [`ConfigError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The dotted field path of a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result of loading or validating configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_names_field() {
        let err = ConfigError::validation("security.token.secret", "too short");
        assert_eq!(err.to_string(), "security.token.secret: too short");
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("security.token.secret"));
    }

    #[test]
    fn test_other_errors_have_no_field() {
        let err = ConfigError::file_not_found("/etc/tourgate.yaml");
        assert!(err.to_string().contains("/etc/tourgate.yaml"));
        assert!(!err.is_validation());
        assert_eq!(err.field(), None);
    }
}
