//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pagination gateway CLI
#[derive(Parser, Debug)]
#[command(name = "pagegate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Gateway configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve pagination parameters the way a list request would
    Resolve {
        /// Continue token from a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Page size
        #[arg(long)]
        limit: Option<String>,

        /// Explicit mode: "cursor" or "legacy"
        #[arg(long)]
        pagination: Option<String>,

        /// Legacy page number
        #[arg(long)]
        page: Option<String>,
    },

    /// Check a continue token against the cursor rules
    ValidateCursor {
        /// Token to check
        token: String,
    },

    /// Show the current feature flags and where they came from
    Flags,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// JSON file of items to serve from memory
        #[arg(long, conflicts_with = "upstream")]
        items: Option<PathBuf>,

        /// Kubernetes-style list endpoint to proxy
        #[arg(long)]
        upstream: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
