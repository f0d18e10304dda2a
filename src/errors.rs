// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchrouteError {
    /// Local precondition failure on a batch draft. Never reaches the network.
    #[error("Validation error on `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The remote service rejected the creation request, or the transport failed.
    #[error("Submission failed{}: {detail}", http_suffix(.status))]
    Submission { status: Option<u16>, detail: String },

    /// A poll failed. The tracker absorbs these and retries on the next tick.
    #[error("Transient fetch error: {0}")]
    TransientFetch(String),

    /// A one-off fetch (outside any observation) failed.
    #[error("Fetch failed{}: {detail}", http_suffix(.status))]
    Fetch { status: Option<u16>, detail: String },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Unrecognized batch status: {0:?}")]
    UnrecognizedStatus(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BatchrouteError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BatchrouteError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field name for validation errors, `None` for everything else.
    pub fn field(&self) -> Option<&str> {
        match self {
            BatchrouteError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BatchrouteError>;
