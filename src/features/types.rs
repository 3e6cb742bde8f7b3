//! Feature flag types
//!
//! Defines the flag set, the on-disk document shape and the immutable
//! snapshot shared between concurrent readers.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default location of the flags document
pub const DEFAULT_FLAGS_PATH: &str = "config/flags.json";

/// Default environment override for cursor pagination
pub const DEFAULT_ENV_VAR: &str = "CURSOR_PAGINATION_ENABLED";

/// Default cache TTL for loaded flags
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Boolean feature flags
///
/// Never mutated once published; a reload builds a new value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Default to cursor pagination when the request does not choose a mode
    #[serde(default)]
    pub cursor_pagination_enabled: bool,
}

/// Shape of the flags document on disk
///
/// ```json
/// { "features": { "cursor_pagination_enabled": true } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagsDocument {
    #[serde(default)]
    pub features: FeatureFlags,
}

impl FlagsDocument {
    /// Parse a document, picking YAML or JSON from the file extension
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let parsed = if is_yaml {
            serde_yaml::from_str(contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| Error::config_load(path.display().to_string(), message))
    }
}

/// Where the published flag value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOrigin {
    /// No file and no environment override
    Defaults,
    /// The flags document
    File,
    /// The environment override
    Environment,
}

/// Inputs the store reloads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSources {
    /// Flags document; a missing file is not an error
    pub flags_path: Option<PathBuf>,
    /// Environment variable that overrides the document when set
    pub env_var: Option<String>,
}

impl Default for FlagSources {
    fn default() -> Self {
        Self {
            flags_path: Some(PathBuf::from(DEFAULT_FLAGS_PATH)),
            env_var: Some(DEFAULT_ENV_VAR.to_string()),
        }
    }
}

impl FlagSources {
    /// No file, no environment: always the built-in defaults
    pub fn none() -> Self {
        Self {
            flags_path: None,
            env_var: None,
        }
    }

    /// Set the flags document path
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.flags_path = Some(path.into());
        self
    }

    /// Set the environment override variable
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }
}

/// Cache freshness as seen by the next reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Nothing loaded yet, or invalidated
    Empty,
    /// Younger than the TTL; readers return it without reloading
    Fresh,
    /// Older than the TTL; the next reader reloads
    Stale,
}

/// Flags plus the time they were produced
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    /// Published flags
    pub flags: FeatureFlags,
    /// Which source decided the flag value
    pub origin: FlagOrigin,
    /// Wall-clock time the flags were read
    pub loaded_at: DateTime<Utc>,
    /// Set when the last reload failed and these flags were carried over
    pub degraded: bool,
    /// Monotonic stamp used for TTL checks
    #[serde(skip)]
    checked_at: Instant,
}

impl ConfigSnapshot {
    /// Create a snapshot stamped now
    pub fn new(flags: FeatureFlags, origin: FlagOrigin) -> Self {
        Self {
            flags,
            origin,
            loaded_at: Utc::now(),
            degraded: false,
            checked_at: Instant::now(),
        }
    }

    /// Carry these flags over a failed reload, restarting the TTL window
    pub fn carried_over(&self) -> Self {
        Self {
            flags: self.flags,
            origin: self.origin,
            loaded_at: self.loaded_at,
            degraded: true,
            checked_at: Instant::now(),
        }
    }

    /// Time since this snapshot was stamped
    pub fn age(&self) -> Duration {
        self.checked_at.elapsed()
    }

    /// Whether the snapshot is still within `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
