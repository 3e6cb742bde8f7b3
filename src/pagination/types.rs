//! Pagination types
//!
//! Request-scoped inputs and outputs of mode resolution. Nothing here is
//! shared between requests.

use crate::cursor::{CursorError, ValidatedCursor};
use crate::error::codes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Page size used when the request has no `limit`
pub const DEFAULT_LIMIT: u32 = 16;

/// Largest page size; larger requests are clamped to it
pub const MAX_LIMIT: u32 = 1024;

/// How a list request is paginated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Opaque continue tokens
    Cursor,
    /// Page number and total count
    Legacy,
}

impl PaginationMode {
    /// Mode implied by the feature flag value
    pub fn from_flag(cursor_enabled: bool) -> Self {
        if cursor_enabled {
            Self::Cursor
        } else {
            Self::Legacy
        }
    }

    /// Query parameter spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `pagination` query parameter after parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExplicitMode {
    /// Parameter absent or empty
    #[default]
    None,
    /// `pagination=cursor`
    Cursor,
    /// `pagination=legacy`
    Legacy,
}

impl ExplicitMode {
    /// Parse the raw parameter. Matching is exact and case-sensitive.
    pub fn parse(raw: &str) -> Result<Self, PaginationError> {
        match raw {
            "" => Ok(Self::None),
            "cursor" => Ok(Self::Cursor),
            "legacy" => Ok(Self::Legacy),
            other => Err(PaginationError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }

    /// The forced mode, if any
    pub fn mode(self) -> Option<PaginationMode> {
        match self {
            Self::None => None,
            Self::Cursor => Some(PaginationMode::Cursor),
            Self::Legacy => Some(PaginationMode::Legacy),
        }
    }
}

/// Pagination query parameters, exactly as received
///
/// Missing parameters deserialize to empty strings, which mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationRequest {
    /// `cursor`: opaque continue token
    #[serde(default, rename = "cursor")]
    pub raw_cursor: String,
    /// `limit`: requested page size
    #[serde(default, rename = "limit")]
    pub raw_limit: String,
    /// `pagination`: explicit mode override
    #[serde(default, rename = "pagination")]
    pub raw_mode: String,
    /// `page`: legacy page number, 1-based
    #[serde(default, rename = "page")]
    pub raw_page: String,
}

impl PaginationRequest {
    /// An empty request: no parameters at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `cursor` parameter
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.raw_cursor = cursor.into();
        self
    }

    /// Set the `limit` parameter
    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.raw_limit = limit.into();
        self
    }

    /// Set the `pagination` parameter
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.raw_mode = mode.into();
        self
    }

    /// Set the `page` parameter
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.raw_page = page.into();
        self
    }

    /// Parse the `pagination` parameter
    pub fn explicit_mode(&self) -> Result<ExplicitMode, PaginationError> {
        ExplicitMode::parse(&self.raw_mode)
    }

    /// Whether the client sent a continue token
    pub fn cursor_present(&self) -> bool {
        !self.raw_cursor.is_empty()
    }
}

/// Output of mode resolution, consumed by the list source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPagination {
    /// Selected mode
    pub mode: PaginationMode,
    /// Validated continue token; `None` means first page. Always `None` in
    /// legacy mode.
    pub cursor: Option<ValidatedCursor>,
    /// Page size in `[1, max_limit]`
    pub limit: u32,
    /// Legacy page number, 1-based. `None` in cursor mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLimits {
    /// Page size when `limit` is absent
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Ceiling applied to larger requests
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u32 {
    MAX_LIMIT
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// Malformed or out-of-range pagination parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid pagination mode: {value}. Valid values are 'cursor' or 'legacy'")]
    InvalidMode { value: String },

    #[error("invalid limit format: {value}")]
    InvalidLimitFormat { value: String },

    #[error("limit must be positive, got: {value}")]
    NonPositiveLimit { value: String },

    #[error("invalid page format: {value}")]
    InvalidPageFormat { value: String },

    #[error("page must be positive, got: {value}")]
    NonPositivePage { value: String },

    /// Cursor failed validation. The mode stays recorded: a request that
    /// resolved to cursor mode never falls back to legacy.
    #[error("{source}")]
    InvalidCursor {
        mode: PaginationMode,
        #[source]
        source: CursorError,
    },
}

impl PaginationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMode { .. } => codes::INVALID_PAGINATION_MODE,
            Self::InvalidLimitFormat { .. } | Self::NonPositiveLimit { .. } => codes::INVALID_LIMIT,
            Self::InvalidPageFormat { .. } | Self::NonPositivePage { .. } => codes::INVALID_PAGE,
            Self::InvalidCursor { .. } => codes::INVALID_CURSOR_FORMAT,
        }
    }
}
