//! Error types for Homewatch operations.
//!
//! This module defines [`HomewatchError`], the error enum shared by every
//! Homewatch crate. Contract violations inside the alert engine (merging an
//! alarm into an alert with a different signature) are not represented here:
//! those are bugs in the ingestion pipeline and panic instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`HomewatchError`].
pub type Result<T> = std::result::Result<T, HomewatchError>;

/// Error type for all Homewatch operations.
#[derive(Debug, Error)]
pub enum HomewatchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// An explicitly requested config file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// JSON parsing error
    #[error("JSON parse error in {context}: {message}")]
    JsonParse {
        context: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A string did not name any variant of a closed enum
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    // =========================================================================
    // Alert Errors
    // =========================================================================
    /// Alert not found (stale id, already swept)
    #[error("Alert not found: {alert_id}")]
    AlertNotFound { alert_id: String },

    /// A lock guarding shared alert state was poisoned by a panicking thread
    #[error("Lock poisoned: {resource}")]
    LockPoisoned { resource: &'static str },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in Homewatch)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HomewatchError {
    /// Map a failed config read, telling a missing file apart from other I/O errors
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ConfigNotFound { path, source }
        } else {
            Self::io("reading config", path, source)
        }
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error
    pub fn json_parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            context: context.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an UnknownVariant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Create an AlertNotFound error
    pub fn alert_not_found(alert_id: impl Into<String>) -> Self {
        Self::AlertNotFound {
            alert_id: alert_id.into(),
        }
    }

    /// Create a LockPoisoned error
    pub fn lock_poisoned(resource: &'static str) -> Self {
        Self::LockPoisoned { resource }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if this error reports a missing alert
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AlertNotFound { .. })
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.homewatch/config.yaml or pass --config with a valid path")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ConfigValidation { .. } => Some("All durations and sizes must be at least 1"),
            Self::AlertNotFound { .. } => {
                Some("The alert was acknowledged or expired; refresh the alert list")
            }
            Self::LockPoisoned { .. } => Some("Restart homewatch; a worker thread panicked"),
            _ => None,
        }
    }
}
