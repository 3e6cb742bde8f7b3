//! Pagination mode resolution
//!
//! Precedence, highest first:
//! 1. explicit `pagination=cursor|legacy`
//! 2. a non-empty `cursor` parameter selects cursor mode
//! 3. the cursor pagination feature flag
//!
//! Limit resolution does not depend on the mode.

use super::types::{
    ExplicitMode, PaginationError, PaginationLimits, PaginationMode, PaginationRequest,
    ResolvedPagination,
};
use crate::cursor::CursorValidator;
use crate::features::FeatureConfigStore;
use std::num::IntErrorKind;
use std::sync::Arc;
use tracing::debug;

/// Which precedence rule chose the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeReason {
    /// `pagination` parameter
    Explicit,
    /// Client already holds a continue token
    CursorPresent,
    /// Feature flag default
    FeatureFlag,
}

/// Apply rules 1 and 2. `None` means the feature flag decides.
pub fn precedence(
    explicit: ExplicitMode,
    cursor_present: bool,
) -> Option<(PaginationMode, ModeReason)> {
    if let Some(mode) = explicit.mode() {
        return Some((mode, ModeReason::Explicit));
    }
    if cursor_present {
        return Some((PaginationMode::Cursor, ModeReason::CursorPresent));
    }
    None
}

/// Parse the `limit` parameter
///
/// Absent → default, unparseable or non-positive → error, above the
/// maximum → clamped to the maximum.
pub fn parse_limit(raw: &str, limits: &PaginationLimits) -> Result<u32, PaginationError> {
    if raw.is_empty() {
        return Ok(limits.default_limit);
    }

    let parsed = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Ok(limits.max_limit),
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
            return Err(PaginationError::NonPositiveLimit {
                value: raw.to_string(),
            })
        }
        Err(_) => {
            return Err(PaginationError::InvalidLimitFormat {
                value: raw.to_string(),
            })
        }
    };

    if parsed <= 0 {
        return Err(PaginationError::NonPositiveLimit {
            value: raw.to_string(),
        });
    }

    Ok(u32::try_from(parsed).map_or(limits.max_limit, |limit| limit.min(limits.max_limit)))
}

/// Parse the legacy `page` parameter. Absent → 1.
pub fn parse_page(raw: &str) -> Result<u32, PaginationError> {
    if raw.is_empty() {
        return Ok(1);
    }

    let parsed = raw
        .parse::<i64>()
        .map_err(|_| PaginationError::InvalidPageFormat {
            value: raw.to_string(),
        })?;

    if parsed <= 0 {
        return Err(PaginationError::NonPositivePage {
            value: raw.to_string(),
        });
    }

    u32::try_from(parsed).map_err(|_| PaginationError::InvalidPageFormat {
        value: raw.to_string(),
    })
}

/// Pure resolver: a total function of the request and the flag value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeResolver {
    limits: PaginationLimits,
    validator: CursorValidator,
}

impl ModeResolver {
    /// Create a resolver with explicit bounds
    pub fn new(limits: PaginationLimits, validator: CursorValidator) -> Self {
        Self { limits, validator }
    }

    /// Page size bounds
    pub fn limits(&self) -> &PaginationLimits {
        &self.limits
    }

    /// Cursor validator
    pub fn validator(&self) -> &CursorValidator {
        &self.validator
    }

    /// Resolve a request given the current flag value
    pub fn resolve(
        &self,
        request: &PaginationRequest,
        flag_enabled: bool,
    ) -> Result<ResolvedPagination, PaginationError> {
        let explicit = request.explicit_mode()?;
        let mode = precedence(explicit, request.cursor_present())
            .map_or_else(|| PaginationMode::from_flag(flag_enabled), |(mode, _)| mode);
        self.complete(request, mode)
    }

    /// Validate the remaining parameters once the mode is known
    pub fn complete(
        &self,
        request: &PaginationRequest,
        mode: PaginationMode,
    ) -> Result<ResolvedPagination, PaginationError> {
        let cursor = match mode {
            PaginationMode::Cursor => self
                .validator
                .validate_owned(request.raw_cursor.clone())
                .map_err(|source| PaginationError::InvalidCursor { mode, source })?,
            PaginationMode::Legacy => None,
        };

        let limit = parse_limit(&request.raw_limit, &self.limits)?;

        let page = match mode {
            PaginationMode::Legacy => Some(parse_page(&request.raw_page)?),
            PaginationMode::Cursor => None,
        };

        Ok(ResolvedPagination {
            mode,
            cursor,
            limit,
            page,
        })
    }
}

/// Resolve with the default limits and validator
pub fn resolve(
    request: &PaginationRequest,
    flag_enabled: bool,
) -> Result<ResolvedPagination, PaginationError> {
    ModeResolver::default().resolve(request, flag_enabled)
}

/// Resolver backed by the feature config store
///
/// The store is only consulted when neither the explicit mode nor cursor
/// presence decides.
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    policy: ModeResolver,
    store: Arc<FeatureConfigStore>,
}

impl PaginationResolver {
    /// Create a resolver with default bounds
    pub fn new(store: Arc<FeatureConfigStore>) -> Self {
        Self::with_policy(ModeResolver::default(), store)
    }

    /// Create a resolver with explicit bounds
    pub fn with_policy(policy: ModeResolver, store: Arc<FeatureConfigStore>) -> Self {
        Self { policy, store }
    }

    /// The pure resolver
    pub fn policy(&self) -> &ModeResolver {
        &self.policy
    }

    /// The feature config store
    pub fn store(&self) -> &Arc<FeatureConfigStore> {
        &self.store
    }

    /// Resolve a request
    pub async fn resolve(
        &self,
        request: &PaginationRequest,
    ) -> Result<ResolvedPagination, PaginationError> {
        let explicit = request.explicit_mode()?;

        let (mode, reason) = match precedence(explicit, request.cursor_present()) {
            Some(decided) => decided,
            None => {
                let enabled = self.store.get_cursor_pagination_enabled().await;
                (PaginationMode::from_flag(enabled), ModeReason::FeatureFlag)
            }
        };
        debug!(mode = %mode, reason = ?reason, "pagination mode resolved");

        self.policy.complete(request, mode)
    }
}
