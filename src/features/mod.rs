//! Feature flag module
//!
//! Holds the one evolving flag set that decides the default pagination mode.
//!
//! # Overview
//!
//! [`FeatureConfigStore`] builds [`FeatureFlags`] from built-in defaults, an
//! optional flags document and an environment override (in that order,
//! environment wins). The result is published as an immutable
//! [`ConfigSnapshot`] and reused until it is older than the TTL or the store
//! is invalidated. Concurrent readers that find the cache stale coalesce into
//! a single reload.

mod store;
mod types;

pub use store::FeatureConfigStore;
pub use types::{
    CacheState, ConfigSnapshot, FeatureFlags, FlagOrigin, FlagSources, FlagsDocument,
    DEFAULT_CACHE_TTL, DEFAULT_ENV_VAR, DEFAULT_FLAGS_PATH,
};
