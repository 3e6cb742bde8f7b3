//! Gateway configuration
//!
//! Every field has a default, so an empty document (or no document at all)
//! yields the stock limits: page size 16, maximum 1024, cursor bounds of
//! 512 characters encoded and 512 bytes decoded, flags cached for five
//! minutes.

use crate::cursor::{CursorLimits, CursorValidator};
use crate::error::{Error, Result};
use crate::features::{
    FeatureConfigStore, FlagSources, DEFAULT_CACHE_TTL, DEFAULT_ENV_VAR, DEFAULT_FLAGS_PATH,
};
use crate::pagination::{ModeResolver, PaginationLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete gateway configuration loaded from YAML or JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Page size bounds
    #[serde(default)]
    pub pagination: PaginationLimits,

    /// Cursor validation bounds
    #[serde(default)]
    pub cursor: CursorLimits,

    /// Feature flag sources and caching
    #[serde(default)]
    pub features: FeatureSourceConfig,

    /// Upstream access settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl GatewayConfig {
    /// Load from a file, picking YAML or JSON from the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject bounds that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_limit == 0 {
            return Err(Error::invalid_value(
                "pagination.default_limit",
                "must be at least 1",
            ));
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            return Err(Error::invalid_value(
                "pagination.default_limit",
                format!(
                    "{} exceeds pagination.max_limit {}",
                    self.pagination.default_limit, self.pagination.max_limit
                ),
            ));
        }
        if self.cursor.max_encoded_len == 0 {
            return Err(Error::invalid_value(
                "cursor.max_encoded_len",
                "must be at least 1",
            ));
        }
        if self.cursor.max_decoded_len == 0 {
            return Err(Error::invalid_value(
                "cursor.max_decoded_len",
                "must be at least 1",
            ));
        }
        if self.upstream.max_scan_items == 0 {
            return Err(Error::invalid_value(
                "upstream.max_scan_items",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Pure resolver built from the configured bounds
    pub fn mode_resolver(&self) -> ModeResolver {
        ModeResolver::new(self.pagination, CursorValidator::new(self.cursor))
    }

    /// Feature store built from the configured sources
    pub fn feature_store(&self) -> FeatureConfigStore {
        FeatureConfigStore::new(self.features.sources(), self.features.cache_ttl())
    }
}

// ============================================================================
// Feature Sources
// ============================================================================

/// Where feature flags come from and how long they are cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSourceConfig {
    /// Flags document; set to null to disable
    #[serde(default = "default_flags_path")]
    pub flags_path: Option<PathBuf>,

    /// Environment override; set to null to disable
    #[serde(default = "default_env_var")]
    pub env_var: Option<String>,

    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_flags_path() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_FLAGS_PATH))
}

fn default_env_var() -> Option<String> {
    Some(DEFAULT_ENV_VAR.to_string())
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

impl Default for FeatureSourceConfig {
    fn default() -> Self {
        Self {
            flags_path: default_flags_path(),
            env_var: default_env_var(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl FeatureSourceConfig {
    /// Flag sources for the store
    pub fn sources(&self) -> FlagSources {
        FlagSources {
            flags_path: self.flags_path.clone(),
            env_var: self.env_var.clone(),
        }
    }

    /// Cache TTL
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

// ============================================================================
// Upstream
// ============================================================================

/// Upstream access settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Most items a legacy-mode request may scan before it stops walking
    /// continue tokens
    #[serde(default = "default_max_scan_items")]
    pub max_scan_items: usize,
}

fn default_max_scan_items() -> usize {
    10_000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            max_scan_items: default_max_scan_items(),
        }
    }
}
