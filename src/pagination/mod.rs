//! Pagination module
//!
//! Decides, per list request, between legacy (page number) and cursor
//! (continue token) pagination.
//!
//! # Overview
//!
//! A [`PaginationRequest`] carries the raw query parameters. Resolution
//! picks the mode by precedence (explicit parameter, then cursor presence,
//! then the feature flag), validates the cursor when cursor mode is chosen
//! and bounds the page size. The result is a [`ResolvedPagination`], the only
//! thing handed to the list source.

mod resolver;
mod types;

pub use resolver::{
    parse_limit, parse_page, precedence, resolve, ModeReason, ModeResolver, PaginationResolver,
};
pub use types::{
    ExplicitMode, PaginationError, PaginationLimits, PaginationMode, PaginationRequest,
    ResolvedPagination, DEFAULT_LIMIT, MAX_LIMIT,
};
