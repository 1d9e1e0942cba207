//! Error types for configuration resolution.
//!
//! Every variant is fatal for startup: the inputs come from static
//! configuration or local files and will not change without the operator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving configuration into a topology.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Malformed connection string: {reason}")]
    MalformedConnectionString { reason: String },

    #[error("Failed to load certificate {}: {reason}", .path.display())]
    CertificateLoadFailure { path: PathBuf, reason: String },

    #[error("Storage directory {} unavailable: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing required configuration key: {key}")]
    MissingRequiredConfig { key: String },

    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    InvalidConfigValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },
}

impl ResolveError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConnectionString {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(key: &str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidConfigValue {
            key: key.to_string(),
            value: value.into(),
            expected,
        }
    }
}

/// Result alias for resolution steps.
pub type ResolveResult<T> = Result<T, ResolveError>;
