//! Command-line interface components
//!
//! This module contains CLI-specific code for the Client Fetcher application,
//! including argument parsing, command handlers and the terminal progress bar.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, ConfigAction, DownloadArgs, GlobalArgs};
pub use commands::{handle_clean, handle_config, handle_download, handle_verify};
pub use progress::TerminalRenderer;
