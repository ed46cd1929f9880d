//! Command handlers for the CLI
//!
//! Each handler receives the configuration already loaded and merged with
//! the global flags, applies its own overrides and drives the coordinator.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{CollectionReport, Coordinator, SessionResult, TaskKind};
use crate::cli::args::{ConfigAction, DownloadArgs};
use crate::cli::progress::TerminalRenderer;
use crate::config::{AppConfig, LOCAL_CONFIG_FILE};
use crate::errors::{AppError, Result};

/// Maximum number of pending files listed by `verify`
const MAX_LISTED_TASKS: usize = 10;

fn build_coordinator(config: &AppConfig) -> Result<Coordinator> {
    let coordinator = Coordinator::new(config.to_coordinator_config())?;
    Ok(coordinator.with_renderer(Arc::new(TerminalRenderer::new())))
}

/// Fetch everything missing or stale
///
/// # Errors
///
/// Returns an error for fatal pipeline failures and for runs where any
/// task failed, so the process exits non-zero.
pub async fn handle_download(mut config: AppConfig, args: DownloadArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let coordinator = build_coordinator(&config)?;
    info!(
        "Installing version {} into {}",
        config.sources.version_id,
        coordinator.layout().game_dir().display()
    );

    if args.dry_run {
        let report = coordinator.plan().await?;
        println!("Dry run for version {}:", config.sources.version_id);
        print_report(&report);
        return Ok(());
    }

    println!(
        "Downloading version {} with {} workers ({} quality)...",
        config.sources.version_id,
        config.download.max_parallelism,
        config.download.graphics_quality
    );

    let result = coordinator.run_download().await?;
    print_session(&result);

    if result.is_success() {
        Ok(())
    } else {
        Err(AppError::generic(format!(
            "Download incomplete: {}",
            result.summary_line()
        )))
    }
}

/// Report what a download run would fetch
pub async fn handle_verify(config: AppConfig) -> Result<()> {
    let coordinator = build_coordinator(&config)?;
    let report = coordinator.plan().await?;

    print_report(&report);

    if report.is_empty() {
        println!("Installation is complete and verified.");
        return Ok(());
    }

    println!();
    println!("Missing or stale files:");
    for task in report.tasks.iter().take(MAX_LISTED_TASKS) {
        println!("  {} ({:?})", task.display_name(), task.kind);
    }
    if report.total_tasks() > MAX_LISTED_TASKS {
        println!("  ... and {} more", report.total_tasks() - MAX_LISTED_TASKS);
    }
    println!();
    println!("Run 'client_fetcher download' to fetch them.");
    Ok(())
}

/// Remove the game directory
pub async fn handle_clean(config: AppConfig, yes: bool) -> Result<()> {
    let coordinator = build_coordinator(&config)?;
    let game_dir = coordinator.layout().game_dir().to_path_buf();

    if !yes && !confirm(&format!("Remove {}?", game_dir.display()))? {
        println!("Aborted.");
        return Ok(());
    }

    if coordinator.clean_install().await? {
        println!("Removed {}", game_dir.display());
    } else {
        println!("Nothing to remove at {}", game_dir.display());
    }
    Ok(())
}

/// Show or create the configuration file
pub async fn handle_config(config: AppConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init => {
            let path = match AppConfig::default_config_path() {
                Ok(path) => path,
                Err(e) => {
                    warn!("{}, writing {} instead", e, LOCAL_CONFIG_FILE);
                    LOCAL_CONFIG_FILE.into()
                }
            };

            if AppConfig::write_default_file(&path).await? {
                println!("Created default configuration file:");
                println!("   {}", path.display());
                println!("   You can customize settings by editing this file.");
            } else {
                println!("Configuration file already exists: {}", path.display());
            }
        }
    }
    Ok(())
}

/// Ask a yes/no question on stdin, defaulting to no
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_report(report: &CollectionReport) {
    println!("  Client:    {}", report.count_kind(TaskKind::Client));
    println!("  Libraries: {}", report.count_kind(TaskKind::Library));
    println!("  Natives:   {}", report.count_kind(TaskKind::Native));
    println!("  Assets:    {}", report.count_kind(TaskKind::Asset));
    println!("  Already valid: {}", report.already_valid);
    println!("  Libraries excluded for this platform: {}", report.excluded_libraries);

    if report.skipped_assets() > 0 {
        println!(
            "  Assets skipped by quality filter: {} (~{} saved)",
            report.skipped_assets(),
            format_bytes(report.estimated_space_saved_bytes())
        );
        for (category, stats) in report.categories.iter().filter(|(_, s)| s.skipped > 0) {
            println!(
                "    {:<10} {} of {} skipped ({:.1}%)",
                category.as_str(),
                stats.skipped,
                stats.total,
                stats.skipped_percentage()
            );
        }
    }
    println!("  To download: {}", report.total_tasks());
}

fn print_session(result: &SessionResult) {
    println!();
    println!("Download Summary:");
    println!("  {}", result.summary_line());
    println!("  Failed: {}", result.failed);
    println!("  Downloaded: {}", format_bytes(result.bytes_downloaded));
    println!(
        "  Total time: {}",
        crate::app::coordinator::format_duration(result.total_duration)
    );

    if !result.failures.is_empty() {
        println!();
        println!("Failed files:");
        for failure in &result.failures {
            println!("  {} ({})", failure.destination, failure.reason);
        }
    }
}

/// Format a byte count with binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
