//! In-memory list source
//!
//! Serves a fixed item list the way a Kubernetes API server would: continue
//! tokens are base64 text that carry the resume offset and the time they
//! were issued, and they stop working after a token TTL.

use super::types::{ListPage, ListQuery, ListSource};
use crate::classify::UpstreamStatus;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Default lifetime of issued continue tokens
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// List source over a fixed vector of items
#[derive(Debug, Clone)]
pub struct InMemoryListSource {
    items: Vec<Value>,
    token_ttl: Duration,
}

impl InMemoryListSource {
    /// Create a source over `items`
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Set how long issued tokens stay valid
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Load items from a JSON file holding either an array or `{"items": [...]}`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read items file {}: {e}", path.display()),
            )
        })?;
        let value: Value = serde_json::from_str(&contents)?;

        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(Error::config(format!(
                        "Items file {} has no 'items' array",
                        path.display()
                    )))
                }
            },
            _ => {
                return Err(Error::config(format!(
                    "Items file {} must hold a JSON array",
                    path.display()
                )))
            }
        };

        Ok(Self::new(items))
    }

    /// Number of items served
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decode a token into its resume offset, checking expiry
    fn offset_from_token(&self, token: &str) -> Result<usize> {
        let (offset, issued_ms) = decode_token(token)
            .ok_or_else(|| Error::upstream(UpstreamStatus::BadRequest, "invalid continue token"))?;

        let age_ms = Utc::now().timestamp_millis().saturating_sub(issued_ms);
        if age_ms > self.token_ttl.as_millis() as i64 {
            return Err(Error::upstream(UpstreamStatus::Gone, "continue token has expired"));
        }

        if offset > self.items.len() {
            return Err(Error::upstream(UpstreamStatus::BadRequest, "invalid continue token"));
        }

        Ok(offset)
    }
}

#[async_trait]
impl ListSource for InMemoryListSource {
    async fn list(&self, query: ListQuery) -> Result<ListPage> {
        let start = match &query.continue_token {
            Some(token) => self.offset_from_token(token.as_str())?,
            None => 0,
        };
        let end = start
            .saturating_add(query.limit as usize)
            .min(self.items.len());

        let continue_token = (end < self.items.len())
            .then(|| encode_token(end, Utc::now().timestamp_millis()));

        Ok(ListPage {
            items: self.items[start..end].to_vec(),
            continue_token,
        })
    }
}

/// Encode a resume offset and issue time as a continue token
pub(crate) fn encode_token(offset: usize, issued_ms: i64) -> String {
    STANDARD.encode(format!("{offset}:{issued_ms}"))
}

fn decode_token(token: &str) -> Option<(usize, i64)> {
    let bytes = STANDARD.decode(token).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (offset, issued) = text.split_once(':')?;
    Some((offset.parse().ok()?, issued.parse().ok()?))
}
