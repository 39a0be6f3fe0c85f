//! Error types and result aliases for forge operations.
//!
//! Provides a unified error type covering every failure the collector can
//! surface, from HTTP transport problems to malformed registry payloads.

use thiserror::Error;

/// Unified error type for all forge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // Registry errors
    #[error("Transport error on {url}: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to parse registry response: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Registry protocol violation: {message}")]
    Protocol { message: String },

    #[error("Unknown category '{category}'; supported categories: {supported}")]
    InvalidCategory { category: String, supported: String },

    // Archive errors
    #[error("Archive error: {message}")]
    Archive { message: String },

    // Config errors
    #[error("Failed to parse forge.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for forge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

impl ForgeError {
    /// Create a transport error for a response with a non-success status
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            url: url.into(),
            status: Some(status),
            message: format!("registry returned status {}", status),
            source: None,
        }
    }

    /// Create a transport error from a connection-level failure
    pub fn transport<E>(url: impl Into<String>, message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            url: url.into(),
            status: None,
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error without an underlying JSON error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error from a serde_json failure
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// HTTP status attached to a transport error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ForgeError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if retrying the same request may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ForgeError::Transport { status: None, .. } => true,
            ForgeError::Transport { status: Some(code), .. } => {
                matches!(code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ForgeError::Transport { status: Some(404), .. } => {
                Some("Check the registry URL; the requested resource does not exist")
            }
            ForgeError::Transport { .. } => Some("Check your internet connection and try again"),
            ForgeError::Parse { .. } => {
                Some("The registry answered with an unexpected payload; check the base URL")
            }
            ForgeError::InvalidCategory { .. } => Some("Use the 'module' category"),
            ForgeError::Archive { .. } => {
                Some("Run once with --archive to record responses before using --fetch-archive")
            }
            ForgeError::ConfigValidation { .. } | ForgeError::TomlParse { .. } => {
                Some("Fix forge.toml or the FORGE_* environment variables")
            }
            _ => None,
        }
    }
}
