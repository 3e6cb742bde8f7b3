//! CLI module
//!
//! Command-line interface for the pagination gateway.
//!
//! # Commands
//!
//! - `resolve` - Resolve pagination parameters without listing anything
//! - `validate-cursor` - Check a continue token
//! - `flags` - Show the current feature flags
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, AppState, ServerConfig, SourceConfig};
