//! Client Fetcher CLI application
//!
//! Command-line interface for bootstrapping a game client installation from
//! its version manifest, with concurrent verified downloads and progress
//! tracking.

use std::process;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

use client_fetcher::cli::{
    handle_clean, handle_config, handle_download, handle_verify, Cli, Commands,
};
use client_fetcher::config::AppConfig;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let mut config = AppConfig::load(cli.global.config.clone())
        .await
        .context("Failed to load configuration")?;
    cli.global.apply(&mut config);

    init_logging(&cli, &config.logging.level)?;

    info!("Client Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(config, args).await?
        }
        Commands::Verify => {
            info!("Executing verify command");
            handle_verify(config).await?
        }
        Commands::Clean { yes } => {
            info!("Executing clean command");
            handle_clean(config, yes).await?
        }
        Commands::Config { action } => handle_config(config, action).await?,
    }

    Ok(())
}

/// Initialize logging from the verbosity flags and the configured level
fn init_logging(cli: &Cli, configured_level: &str) -> anyhow::Result<()> {
    let log_level = cli.log_level(configured_level);

    let directive: Directive = format!("client_fetcher={}", log_level)
        .parse()
        .context("Invalid log directive")?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    }
    Ok(())
}
