//! API response envelopes
//!
//! Pagination-relevant response bodies and the mapping from crate errors to
//! HTTP status, error code and retry guidance.

use crate::error::{codes, Error};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful payload
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Wrap an error body
    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// A page of list results
///
/// Cursor mode always includes `nextCursor`; an empty string means the
/// listing is complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListResponse {
    /// Legacy page with totals
    #[serde(rename_all = "camelCase")]
    Legacy {
        items: Vec<Value>,
        total: usize,
        page: u32,
        page_size: u32,
    },
    /// Cursor page
    #[serde(rename_all = "camelCase")]
    Cursor {
        items: Vec<Value>,
        next_cursor: String,
    },
}

impl ListResponse {
    /// Items on this page
    pub fn items(&self) -> &[Value] {
        match self {
            Self::Legacy { items, .. } | Self::Cursor { items, .. } => items,
        }
    }

    /// Next cursor in cursor mode
    pub fn next_cursor(&self) -> Option<&str> {
        match self {
            Self::Cursor { next_cursor, .. } => Some(next_cursor),
            Self::Legacy { .. } => None,
        }
    }
}

/// Retry guidance attached to retryable errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMetadata {
    pub retryable: bool,
    pub code: &'static str,
    /// Where to resume; `first_page` when the token cannot be reused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<&'static str>,
}

/// Error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ErrorMetadata>,
}

/// An error ready to be written as an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorBody,
}

impl ApiError {
    /// Whether the client may retry
    pub fn is_retryable(&self) -> bool {
        self.body.metadata.as_ref().is_some_and(|m| m.retryable)
    }
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        let status = err.status();
        let code = err.code();

        // Client mistakes are echoed; upstream and internal detail is not
        let message = match err {
            Error::Pagination(e) => e.to_string(),
            Error::Cursor(e) => e.to_string(),
            _ if code == codes::CONFIG_LOAD_ERROR => "Server configuration error".to_string(),
            _ => err.kind().public_message().to_string(),
        };

        let metadata = if err.is_retryable() {
            let kind = err.kind();
            Some(ErrorMetadata {
                retryable: true,
                code,
                restart: kind.restart_from_first_page().then_some("first_page"),
            })
        } else {
            None
        };

        Self {
            status,
            body: ErrorBody {
                message,
                code,
                metadata,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiResponse::failure(self.body))).into_response()
    }
}
