//! Error types for pagegate
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every error carries a stable machine-readable code so that clients can
//! branch on it without matching human text.

use crate::classify::{classify, ErrorKind, UpstreamStatus};
use crate::cursor::CursorError;
use crate::pagination::PaginationError;
use thiserror::Error;

/// Stable machine-readable error codes returned to clients
pub mod codes {
    pub const INVALID_PAGINATION_MODE: &str = "INVALID_PAGINATION_MODE";
    pub const INVALID_LIMIT: &str = "INVALID_LIMIT";
    pub const INVALID_PAGE: &str = "INVALID_PAGE";
    pub const INVALID_CURSOR_FORMAT: &str = "INVALID_CURSOR_FORMAT";
    pub const CONTINUE_TOKEN_EXPIRED: &str = "CONTINUE_TOKEN_EXPIRED";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const CONFIG_LOAD_ERROR: &str = "CONFIG_LOAD_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// The main error type for pagegate
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to load feature flags from '{path}': {message}")]
    ConfigLoad { path: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    // ============================================================================
    // Upstream Errors
    // ============================================================================
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        status: UpstreamStatus,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a feature flag load error
    pub fn config_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a typed upstream error
    pub fn upstream(status: UpstreamStatus, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Taxonomy kind of this error, as seen by the response layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Pagination(PaginationError::InvalidCursor { .. }) | Error::Cursor(_) => {
                ErrorKind::InvalidCursor
            }
            _ => classify(self),
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::Pagination(e) => e.code(),
            Error::Cursor(_) => codes::INVALID_CURSOR_FORMAT,
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::ConfigLoad { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => codes::CONFIG_LOAD_ERROR,
            _ => self.kind().code(),
        }
    }

    /// HTTP status code the response layer should use for this error
    pub fn status(&self) -> u16 {
        match self {
            Error::Pagination(_) | Error::Cursor(_) => 400,
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::ConfigLoad { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => 500,
            _ => self.kind().status(),
        }
    }

    /// Whether the caller may retry the same request later
    ///
    /// An expired continue token is retryable only by restarting from the
    /// first page; see [`ErrorKind::restart_from_first_page`].
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TokenExpired | ErrorKind::Unavailable)
    }
}

/// Result type alias for pagegate
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
