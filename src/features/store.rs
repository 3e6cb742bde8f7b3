//! Feature config store implementation
//!
//! Caches the flag snapshot behind a read/write lock and reloads it lazily
//! once it is older than the TTL. There is no background timer.

use super::types::{
    CacheState, ConfigSnapshot, FeatureFlags, FlagOrigin, FlagSources, FlagsDocument,
    DEFAULT_CACHE_TTL,
};
use crate::error::{Error, Result};
use std::io::ErrorKind as IoErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Process-wide cache of feature flags
///
/// Share it behind an `Arc`; every clone of the `Arc` sees the same
/// snapshot.
#[derive(Debug)]
pub struct FeatureConfigStore {
    /// Where flags are read from
    sources: FlagSources,
    /// Maximum snapshot age before a reload
    ttl: Duration,
    /// Current snapshot, replaced whole on reload
    cached: RwLock<Option<Arc<ConfigSnapshot>>>,
    /// Completed reload attempts
    reloads: AtomicU64,
}

impl Default for FeatureConfigStore {
    fn default() -> Self {
        Self::new(FlagSources::default(), DEFAULT_CACHE_TTL)
    }
}

impl FeatureConfigStore {
    /// Create a store reading from `sources`, caching for `ttl`
    pub fn new(sources: FlagSources, ttl: Duration) -> Self {
        Self {
            sources,
            ttl,
            cached: RwLock::new(None),
            reloads: AtomicU64::new(0),
        }
    }

    /// Create a store that never reads a file or the environment
    pub fn with_defaults() -> Self {
        Self::new(FlagSources::none(), DEFAULT_CACHE_TTL)
    }

    /// The configured sources
    pub fn sources(&self) -> &FlagSources {
        &self.sources
    }

    /// The configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached snapshot, reloading it if missing or stale
    ///
    /// A reload error is returned to the caller. If a previous snapshot
    /// existed it stays published (marked degraded) for another TTL window.
    pub async fn load(&self) -> Result<Arc<ConfigSnapshot>> {
        {
            let cached = self.cached.read().await;
            if let Some(snapshot) = cached.as_ref() {
                if snapshot.is_fresh(self.ttl) {
                    return Ok(Arc::clone(snapshot));
                }
            }
        }

        let mut cached = self.cached.write().await;

        // Another task may have reloaded while we waited for the write lock
        if let Some(snapshot) = cached.as_ref() {
            if snapshot.is_fresh(self.ttl) {
                return Ok(Arc::clone(snapshot));
            }
        }

        self.reloads.fetch_add(1, Ordering::Relaxed);

        match self.read_flags().await {
            Ok((flags, origin)) => {
                let snapshot = Arc::new(ConfigSnapshot::new(flags, origin));
                *cached = Some(Arc::clone(&snapshot));
                debug!(
                    enabled = flags.cursor_pagination_enabled,
                    origin = ?origin,
                    "feature flags reloaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                if let Some(previous) = cached.as_ref() {
                    warn!(error = %e, "feature flag reload failed, keeping previous snapshot");
                    *cached = Some(Arc::new(previous.carried_over()));
                } else {
                    warn!(error = %e, "feature flag reload failed, no snapshot available");
                }
                Err(e)
            }
        }
    }

    /// Current cursor pagination default. Never fails.
    ///
    /// Falls back to the last published snapshot when a reload fails, and to
    /// `false` when nothing was ever published.
    pub async fn get_cursor_pagination_enabled(&self) -> bool {
        match self.load().await {
            Ok(snapshot) => snapshot.flags.cursor_pagination_enabled,
            Err(_) => self
                .snapshot()
                .await
                .is_some_and(|snapshot| snapshot.flags.cursor_pagination_enabled),
        }
    }

    /// Drop the cached snapshot so the next access reloads regardless of TTL
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        *cached = None;
        debug!("feature flag cache invalidated");
    }

    /// Peek at the published snapshot without reloading
    pub async fn snapshot(&self) -> Option<Arc<ConfigSnapshot>> {
        self.cached.read().await.clone()
    }

    /// Freshness of the published snapshot
    pub async fn cache_state(&self) -> CacheState {
        match self.cached.read().await.as_ref() {
            None => CacheState::Empty,
            Some(snapshot) if snapshot.is_fresh(self.ttl) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// Number of reload attempts made so far
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Build flags from defaults, then the file, then the environment
    async fn read_flags(&self) -> Result<(FeatureFlags, FlagOrigin)> {
        let mut flags = FeatureFlags::default();
        let mut origin = FlagOrigin::Defaults;

        if let Some(path) = &self.sources.flags_path {
            match tokio::fs::read_to_string(path).await {
                Ok(contents) => {
                    flags = FlagsDocument::parse(&contents, path)?.features;
                    origin = FlagOrigin::File;
                    info!(file = %path.display(), "feature flags loaded from file");
                }
                Err(e) if e.kind() == IoErrorKind::NotFound => {
                    warn!(
                        file = %path.display(),
                        "flags file not found, using defaults/env vars"
                    );
                }
                Err(e) => {
                    return Err(Error::config_load(
                        path.display().to_string(),
                        e.to_string(),
                    ));
                }
            }
        }

        if let Some(var) = &self.sources.env_var {
            if let Some(value) = std::env::var_os(var) {
                flags.cursor_pagination_enabled = value.to_str() == Some("true");
                origin = FlagOrigin::Environment;
            }
        }

        Ok((flags, origin))
    }
}
