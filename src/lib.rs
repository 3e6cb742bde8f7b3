// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagegate
//!
//! Dual-mode pagination for list APIs whose upstream hands out expiring
//! continue tokens.
//!
//! ## Features
//!
//! - **Mode Negotiation**: explicit `pagination` parameter, then cursor
//!   presence, then a feature flag
//! - **Cursor Validation**: length, base64, null-byte and UTF-8 checks before
//!   a token reaches the upstream
//! - **Feature Flags**: file and environment sources behind a TTL cache that
//!   coalesces concurrent reloads
//! - **Error Classification**: expired tokens, malformed tokens and upstream
//!   outages mapped to stable codes with retry guidance
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagegate::{FeatureConfigStore, PaginationRequest, PaginationResolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pagegate::Result<()> {
//!     let store = Arc::new(FeatureConfigStore::default());
//!     let resolver = PaginationResolver::new(store);
//!
//!     let request = PaginationRequest::new().limit("50");
//!     let resolved = resolver.resolve(&request).await?;
//!     println!("{} mode, {} items", resolved.mode, resolved.limit);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 HTTP / CLI  (GET /items, resolve)               │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │      ListService: resolve → list source → ListResponse          │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────┬────────────────┼──────────────┬───────────────────┐
//! │  Features   │   Pagination   │    Cursor    │     Classify      │
//! ├─────────────┼────────────────┼──────────────┼───────────────────┤
//! │ flags.json  │ precedence     │ length       │ 410 → expired     │
//! │ env var     │ limit clamp    │ base64       │ 400 → invalid     │
//! │ TTL cache   │ page number    │ null / UTF-8 │ 503 → unavailable │
//! └─────────────┴────────────────┴──────────────┴───────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document public fields of the response envelopes

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and error codes
pub mod error;

/// Gateway configuration
pub mod config;

/// Feature flags and the TTL-cached store
pub mod features;

/// Continue token validation
pub mod cursor;

/// Pagination mode resolution
pub mod pagination;

/// Upstream error classification
pub mod classify;

/// Upstream list sources
pub mod source;

/// Paginated listing over a source
pub mod service;

/// Response envelopes
pub mod response;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

// Re-export commonly used types
pub use classify::{classify, ErrorKind};
pub use config::GatewayConfig;
pub use cursor::{CursorError, CursorValidator, ValidatedCursor};
pub use features::{FeatureConfigStore, FeatureFlags};
pub use pagination::{
    resolve, PaginationError, PaginationMode, PaginationRequest, PaginationResolver,
    ResolvedPagination,
};
pub use response::{ApiError, ListResponse};
pub use service::ListService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
