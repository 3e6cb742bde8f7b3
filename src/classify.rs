//! Upstream error classification
//!
//! Maps heterogeneous list-source failures onto the small taxonomy the
//! response layer branches on. Typed status information anywhere in the
//! error's `source()` chain decides first. Message matching is only a
//! fallback for upstreams without a typed error channel, and it breaks if
//! the upstream rewords its messages.

use crate::error::{codes, Error};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::debug;

/// Taxonomy kind for a failed list call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The continue token aged out upstream; restart from the first page
    TokenExpired,
    /// The token or request was rejected as malformed
    InvalidCursor,
    /// Transient upstream failure
    Unavailable,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::TokenExpired => codes::CONTINUE_TOKEN_EXPIRED,
            ErrorKind::InvalidCursor => codes::INVALID_CURSOR_FORMAT,
            ErrorKind::Unavailable => codes::SERVICE_UNAVAILABLE,
            ErrorKind::Other => codes::INTERNAL_ERROR,
        }
    }

    /// HTTP status the response layer reports
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::TokenExpired => 410,
            ErrorKind::InvalidCursor => 400,
            ErrorKind::Unavailable => 503,
            ErrorKind::Other => 500,
        }
    }

    /// Client-facing message that does not leak upstream detail
    pub fn public_message(self) -> &'static str {
        match self {
            ErrorKind::TokenExpired => "Continue token has expired",
            ErrorKind::InvalidCursor => "Invalid cursor",
            ErrorKind::Unavailable => "Upstream service unavailable",
            ErrorKind::Other => "Internal server error",
        }
    }

    /// Whether the client must drop its token and start over
    pub fn restart_from_first_page(self) -> bool {
        matches!(self, ErrorKind::TokenExpired)
    }
}

/// Typed status reported by an upstream list source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamStatus {
    /// 410: the resource version behind the token is gone
    Gone,
    /// 400
    BadRequest,
    /// 503
    ServiceUnavailable,
    /// Any other status code
    Other(u16),
}

impl UpstreamStatus {
    /// Map an HTTP status code
    pub fn from_code(code: u16) -> Self {
        match code {
            410 => UpstreamStatus::Gone,
            400 => UpstreamStatus::BadRequest,
            503 => UpstreamStatus::ServiceUnavailable,
            other => UpstreamStatus::Other(other),
        }
    }

    /// The HTTP status code
    pub fn code(self) -> u16 {
        match self {
            UpstreamStatus::Gone => 410,
            UpstreamStatus::BadRequest => 400,
            UpstreamStatus::ServiceUnavailable => 503,
            UpstreamStatus::Other(code) => code,
        }
    }

    fn kind(self) -> ErrorKind {
        match self {
            UpstreamStatus::Gone => ErrorKind::TokenExpired,
            UpstreamStatus::BadRequest => ErrorKind::InvalidCursor,
            UpstreamStatus::ServiceUnavailable => ErrorKind::Unavailable,
            UpstreamStatus::Other(_) => ErrorKind::Other,
        }
    }
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Classify an error. Pure; never fails.
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
    let kind = typed_kind(err).unwrap_or_else(|| message_kind(err));
    debug!(kind = ?kind, error = %err, "classified upstream error");
    kind
}

/// First typed signal found walking the source chain
fn typed_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    std::iter::successors(Some(err), |&e| e.source()).find_map(|e| {
        if let Some(error) = e.downcast_ref::<Error>() {
            return match error {
                Error::Upstream { status, .. } => Some(status.kind()),
                Error::HttpStatus { status, .. } => Some(UpstreamStatus::from_code(*status).kind()),
                Error::Http(inner) => reqwest_kind(inner),
                _ => None,
            };
        }
        e.downcast_ref::<reqwest::Error>().and_then(reqwest_kind)
    })
}

fn reqwest_kind(err: &reqwest::Error) -> Option<ErrorKind> {
    if let Some(status) = err.status() {
        return Some(UpstreamStatus::from_code(status.as_u16()).kind());
    }
    if err.is_connect() || err.is_timeout() {
        return Some(ErrorKind::Unavailable);
    }
    None
}

/// Lower-cased substring matching over the whole chain's messages
fn message_kind(err: &(dyn StdError + 'static)) -> ErrorKind {
    let message = std::iter::successors(Some(err), |&e| e.source())
        .map(|e| e.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join(": ");

    if message.contains("continue token") && message.contains("expired") {
        ErrorKind::TokenExpired
    } else if message.contains("invalid cursor") || message.contains("invalid token") {
        ErrorKind::InvalidCursor
    } else {
        ErrorKind::Other
    }
}
