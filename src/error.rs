// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the rapu toolkit
//!
//! Splits failures into the three families callers handle differently:
//! configuration errors (caller bugs, surfaced immediately), transport
//! errors (offline/timeout/status, surfaced as rejected futures), and
//! validation errors (missing form fields, surfaced with field names).

use thiserror::Error;

/// Result type alias for rapu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the rapu toolkit
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (bad method, bad header, bad payload shape)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No network connectivity
    #[error("No network connectivity: {reason}")]
    Offline { reason: String, waited_ms: Option<u64> },

    /// Operation timed out
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Nonce retrieval failed
    #[error("Nonce retrieval failed: {0}")]
    Nonce(String),

    /// Server returned a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Hooks ID already claimed by another request instance
    #[error("Hooks ID already in use: {0}")]
    HooksId(String),

    /// Form validation failed
    #[error("Validation failed for fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an offline error (no wait attempted)
    pub fn offline<S: Into<String>>(reason: S) -> Self {
        Error::Offline {
            reason: reason.into(),
            waited_ms: None,
        }
    }

    /// Create an offline error after a bounded wait expired
    pub fn offline_after_wait<S: Into<String>>(reason: S, waited_ms: u64) -> Self {
        Error::Offline {
            reason: reason.into(),
            waited_ms: Some(waited_ms),
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a nonce error
    pub fn nonce<S: Into<String>>(msg: S) -> Self {
        Error::Nonce(msg.into())
    }

    /// Create a status error from a response status and message
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Error::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a connectivity error
    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Offline { .. })
    }

    /// Check if this is a caller configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Offline { .. } | Error::Http(_)
        )
    }

    /// Check if the server rejected the request model (4xx validation)
    pub fn is_invalid_model(&self) -> bool {
        matches!(self, Error::Status { status, .. } if *status == 400 || *status == 422)
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
