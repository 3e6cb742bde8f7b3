//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::{serve, ServerConfig, SourceConfig};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::pagination::{PaginationRequest, PaginationResolver};
use crate::response::ApiError;
use serde_json::{json, Value};
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Resolve {
                cursor,
                limit,
                pagination,
                page,
            } => {
                let request = PaginationRequest {
                    raw_cursor: cursor.clone().unwrap_or_default(),
                    raw_limit: limit.clone().unwrap_or_default(),
                    raw_mode: pagination.clone().unwrap_or_default(),
                    raw_page: page.clone().unwrap_or_default(),
                };
                self.resolve(&config, &request).await
            }
            Commands::ValidateCursor { token } => self.validate_cursor(&config, token),
            Commands::Flags => self.flags(&config).await,
            Commands::Serve {
                port,
                items,
                upstream,
            } => {
                let source = match (items, upstream) {
                    (Some(path), _) => SourceConfig::Items(path.clone()),
                    (None, Some(url)) => SourceConfig::Upstream(url.clone()),
                    (None, None) => SourceConfig::Empty,
                };
                serve(ServerConfig { gateway: config, source }, *port).await
            }
        }
    }

    /// Load the gateway configuration, or defaults when none was given
    fn load_config(&self) -> Result<GatewayConfig> {
        match &self.cli.config {
            Some(path) => GatewayConfig::from_file(path),
            None => Ok(GatewayConfig::default()),
        }
    }

    async fn resolve(&self, config: &GatewayConfig, request: &PaginationRequest) -> Result<()> {
        let store = Arc::new(config.feature_store());
        let resolver = PaginationResolver::with_policy(config.mode_resolver(), store);

        match resolver.resolve(request).await {
            Ok(resolved) => {
                self.output_message(&json!({ "resolved": resolved }));
                Ok(())
            }
            Err(e) => {
                let err = Error::from(e);
                let api = ApiError::from(&err);
                self.output_message(&json!({ "status": api.status, "error": api.body }));
                Err(err)
            }
        }
    }

    fn validate_cursor(&self, config: &GatewayConfig, token: &str) -> Result<()> {
        let policy = config.mode_resolver();

        match policy.validator().validate(token) {
            Ok(()) => {
                self.output_message(&json!({ "valid": true }));
                Ok(())
            }
            Err(e) => {
                let err = Error::from(e);
                self.output_message(&json!({
                    "valid": false,
                    "code": err.code(),
                    "message": err.to_string(),
                }));
                Err(err)
            }
        }
    }

    async fn flags(&self, config: &GatewayConfig) -> Result<()> {
        let store = config.feature_store();
        let snapshot = store.load().await?;

        self.output_message(&json!({
            "flags": snapshot.flags,
            "origin": snapshot.origin,
            "loaded_at": snapshot.loaded_at,
            "ttl_secs": store.ttl().as_secs(),
            "sources": {
                "flags_path": store.sources().flags_path,
                "env_var": store.sources().env_var,
            },
        }));
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
