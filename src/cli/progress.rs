//! Terminal progress display for download runs
//!
//! [`TerminalRenderer`] implements the coordinator's [`ProgressRenderer`]
//! with an indicatif bar showing the percentage, `completed/total` and the
//! file currently being fetched. When stderr is not a terminal the bar is
//! hidden and nothing is drawn.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use client_fetcher::app::{Coordinator, CoordinatorConfig};
//! use client_fetcher::cli::TerminalRenderer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = Coordinator::new(CoordinatorConfig::default())?
//!     .with_renderer(Arc::new(TerminalRenderer::new()));
//! # Ok(())
//! # }
//! ```

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::app::coordinator::{ProgressRenderer, ProgressSnapshot};
use crate::constants::progress::MAX_FILENAME_WIDTH;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {pos}/{len} {msg}";

/// Single-bar progress display
#[derive(Debug)]
pub struct TerminalRenderer {
    bar: ProgressBar,
    max_filename_width: usize,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    /// Create a renderer drawing to stderr when it is a terminal
    pub fn new() -> Self {
        let target = if atty::is(atty::Stream::Stderr) {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self::with_draw_target(target)
    }

    /// Create a renderer that draws nothing
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        // The template is a constant; fall back to the default style if it is rejected
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);

        Self {
            bar,
            max_filename_width: MAX_FILENAME_WIDTH,
        }
    }

    /// Current bar position
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current bar length
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressRenderer for TerminalRenderer {
    fn render(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total as u64);
        self.bar.set_position(snapshot.completed as u64);

        let message = snapshot
            .current_file
            .as_deref()
            .map(|name| truncate_filename(name, self.max_filename_width))
            .unwrap_or_default();
        self.bar.set_message(message);
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Keep the tail of `name` within `max_width` characters
pub fn truncate_filename(name: &str, max_width: usize) -> String {
    let chars = name.chars().count();
    if chars <= max_width {
        return name.to_string();
    }

    let keep = max_width.saturating_sub(3);
    let tail: String = name.chars().skip(chars - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(completed: usize, total: usize, file: Option<&str>) -> ProgressSnapshot {
        ProgressSnapshot {
            completed,
            total,
            succeeded: completed,
            failed: 0,
            current_file: file.map(str::to_string),
        }
    }

    #[test]
    fn test_render_tracks_counters() {
        let renderer = TerminalRenderer::hidden();

        renderer.render(&snapshot(3, 10, Some("client.jar")));
        assert_eq!(renderer.position(), 3);
        assert_eq!(renderer.length(), Some(10));

        renderer.render(&snapshot(10, 10, None));
        assert_eq!(renderer.position(), 10);
        renderer.clear();
    }

    /// Test filename truncation
    ///
    /// Verifies that long filenames are truncated from the front to fit
    /// within the configured display width.
    #[test]
    fn test_filename_truncation() {
        assert_eq!(truncate_filename("short.jar", 10), "short.jar");

        let truncated = truncate_filename("very_long_filename_that_should_be_truncated.jar", 10);
        assert_eq!(truncated, "...ted.jar");
        assert_eq!(truncated.chars().count(), 10);

        // Multi-byte names never split a character
        assert_eq!(truncate_filename("ääääääääääää.ogg", 8), "...ä.ogg");
    }
}
