//! List source types and traits

use crate::cursor::ValidatedCursor;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One upstream list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Continue token; `None` starts from the beginning
    pub continue_token: Option<ValidatedCursor>,
    /// Maximum number of items to return
    pub limit: u32,
}

impl ListQuery {
    /// Query for the first page
    pub fn first(limit: u32) -> Self {
        Self {
            continue_token: None,
            limit,
        }
    }

    /// Query resuming from a token
    pub fn resume(token: ValidatedCursor, limit: u32) -> Self {
        Self {
            continue_token: Some(token),
            limit,
        }
    }
}

/// One page returned by the upstream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    /// Items on this page
    pub items: Vec<Value>,
    /// Token for the next page; `None` or empty once exhausted
    pub continue_token: Option<String>,
}

impl ListPage {
    /// The next token, treating an empty string as exhausted
    pub fn next_token(&self) -> Option<&str> {
        self.continue_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Whether the listing is exhausted after this page
    pub fn is_last(&self) -> bool {
        self.next_token().is_none()
    }
}

/// Paginated data source with server-side continue tokens
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Fetch one page
    async fn list(&self, query: ListQuery) -> Result<ListPage>;
}
