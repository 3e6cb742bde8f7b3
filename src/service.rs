//! List service
//!
//! Glues resolution to a [`ListSource`]. Cursor mode forwards the validated
//! cursor and returns the upstream continue token as `nextCursor`. Legacy
//! mode walks the upstream listing from the start and slices out the
//! requested page number.

use crate::classify::{ErrorKind, UpstreamStatus};
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{PaginationMode, PaginationRequest, PaginationResolver, ResolvedPagination};
use crate::response::ListResponse;
use crate::source::{ListQuery, ListSource};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default cap on items scanned for one legacy page
pub const DEFAULT_MAX_SCAN_ITEMS: usize = 10_000;

/// Paginated listing over a single source
#[derive(Clone)]
pub struct ListService {
    resolver: Arc<PaginationResolver>,
    source: Arc<dyn ListSource>,
    max_scan_items: usize,
}

impl ListService {
    /// Create a service
    pub fn new(resolver: Arc<PaginationResolver>, source: Arc<dyn ListSource>) -> Self {
        Self {
            resolver,
            source,
            max_scan_items: DEFAULT_MAX_SCAN_ITEMS,
        }
    }

    /// Set the legacy scan cap
    pub fn with_max_scan_items(mut self, max: usize) -> Self {
        self.max_scan_items = max.max(1);
        self
    }

    /// The resolver
    pub fn resolver(&self) -> &Arc<PaginationResolver> {
        &self.resolver
    }

    /// List one page for a request
    pub async fn list(&self, request: &PaginationRequest) -> Result<ListResponse> {
        let resolved = self.resolver.resolve(request).await?;

        let result = match resolved.mode {
            PaginationMode::Cursor => self.list_cursor(resolved).await,
            PaginationMode::Legacy => self.list_legacy(resolved).await,
        };

        if let Err(e) = &result {
            debug!(kind = ?e.kind(), code = e.code(), error = %e, "list failed");
        }
        result
    }

    async fn list_cursor(&self, resolved: ResolvedPagination) -> Result<ListResponse> {
        let query = ListQuery {
            continue_token: resolved.cursor,
            limit: resolved.limit,
        };
        let page = self.source.list(query).await?;

        let next_cursor = page.next_token().unwrap_or_default().to_string();
        if !next_cursor.is_empty()
            && !self
                .resolver
                .policy()
                .validator()
                .is_valid_continue_token(&next_cursor)
        {
            warn!(
                len = next_cursor.len(),
                "upstream issued a continue token that clients will not be able to send back"
            );
        }

        Ok(ListResponse::Cursor {
            items: page.items,
            next_cursor,
        })
    }

    async fn list_legacy(&self, resolved: ResolvedPagination) -> Result<ListResponse> {
        let page = resolved.page.unwrap_or(1);
        let page_size = resolved.limit;

        // A token that expires mid-scan restarts the walk once
        let mut items = match self.scan_all().await {
            Err(e) if e.kind() == ErrorKind::TokenExpired => {
                warn!(error = %e, "continue token expired during legacy scan, restarting");
                self.scan_all().await.map_err(|e| match e.kind() {
                    ErrorKind::TokenExpired => Error::upstream(
                        UpstreamStatus::ServiceUnavailable,
                        format!("listing changed during legacy scan: {e}"),
                    ),
                    _ => e,
                })?
            }
            result => result?,
        };

        let total = items.len();
        let start = (page as usize - 1).saturating_mul(page_size as usize);
        let end = start.saturating_add(page_size as usize).min(total);
        let items = if start < total {
            items.drain(start..end).collect()
        } else {
            Vec::new()
        };

        Ok(ListResponse::Legacy {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Walk the upstream listing from the first page up to the scan cap
    async fn scan_all(&self) -> Result<Vec<Value>> {
        let chunk = self.resolver.policy().limits().max_limit;
        let validator = self.resolver.policy().validator();

        let mut items: Vec<Value> = Vec::new();
        let mut query = ListQuery::first(chunk);
        loop {
            let upstream = self.source.list(query).await?;
            let next = upstream.next_token().map(str::to_string);
            items.extend(upstream.items);

            let Some(next) = next else { break };
            if items.len() >= self.max_scan_items {
                warn!(
                    scanned = items.len(),
                    cap = self.max_scan_items,
                    "legacy scan cap reached; totals are truncated"
                );
                break;
            }

            let token = validator
                .validate_owned(next)
                .context("upstream continue token rejected")?;
            query = match token {
                Some(token) => ListQuery::resume(token, chunk),
                None => break,
            };
        }
        Ok(items)
    }
}

impl std::fmt::Debug for ListService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListService")
            .field("max_scan_items", &self.max_scan_items)
            .finish_non_exhaustive()
    }
}
