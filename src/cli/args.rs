//! Command-line argument parsing for Client Fetcher
//!
//! This module defines the CLI structure using clap derive macros. Flags
//! given here override the values loaded from the configuration file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::GraphicsQuality;
use crate::config::AppConfig;

/// Client Fetcher - bootstrap a game client installation
#[derive(Parser, Debug)]
#[command(
    name = "client_fetcher",
    version,
    about = "Fetch, verify and install a game client from its version manifest",
    long_about = "Downloads a versioned manifest and everything it lists: the client binary, shared libraries, \
native bundles for this platform and the asset objects selected by the graphics quality. \
Files already present with a matching SHA-1 digest are never fetched again."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory that contains the game directory
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch everything missing or stale
    Download(DownloadArgs),

    /// Report what is missing or stale without downloading
    Verify,

    /// Remove the game directory
    Clean {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for the download command
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Number of concurrent fetches (3-20)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Asset filter level: low, medium or high
    #[arg(long)]
    pub quality: Option<GraphicsQuality>,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Configuration file actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file if none exists
    Init,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level, falling back to `configured` without flags
    pub fn log_level(&self, configured: &str) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            configured.parse().unwrap_or(tracing::Level::INFO)
        }
    }
}

impl GlobalArgs {
    /// Apply global overrides to a loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.base_dir {
            config.paths.base_dir = dir.clone();
        }
    }
}

impl DownloadArgs {
    /// Apply download overrides to a loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(workers) = self.workers {
            config.download.max_parallelism = workers;
        }
        if let Some(quality) = self.quality {
            config.download.graphics_quality = quality;
        }
        if self.no_progress {
            config.progress.enabled = false;
        }
    }
}
