//! Human-readable reporter.
//!
//! Lines go through the `log` facade at info level so the CLI's logger
//! decides where they end up (console, log file or both). The encode
//! progress bar is drawn by `indicatif` directly on the terminal.

use super::{BatchStartInfo, FileProgressContext, ProgressSnapshot, RULE, Reporter, summary_line};
use crate::processing::{BatchSummary, ConversionOutcome};
use crate::utils::format_duration;
use crate::verification::{ComplianceResult, VerificationSummary};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn progress_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("  Encoding [{bar:40}] {percent:>3}% | {msg}")
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn batch_started(&self, info: &BatchStartInfo) {
        log::info!("Found {} files", style(info.total_files).bold());
        log::info!("Input: {}", info.input_dir);
        log::info!("Output: {}", info.output_dir);
        log::info!(
            "CRF={}, Audio={}, Max={}x{}",
            info.quality,
            info.audio_bitrate,
            info.max_width,
            info.max_height
        );
        log::info!("{RULE}");
    }

    fn file_skipped(&self, context: &FileProgressContext, source_name: &str) {
        log::info!(
            "[{}/{}] {} {}",
            context.current_file,
            context.total_files,
            style("skip (exists):").dim(),
            source_name
        );
    }

    fn file_started(&self, context: &FileProgressContext, source_name: &str, destination_name: &str) {
        log::info!(
            "[{}/{}] convert: {} -> {}",
            context.current_file,
            context.total_files,
            style(source_name).bold(),
            destination_name
        );
    }

    fn encoding_started(&self, _source_name: &str) {
        self.finish_progress();
        let pb = ProgressBar::new(100);
        pb.set_style(Self::progress_style());
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn encoding_progress(&self, progress: &ProgressSnapshot) {
        let Ok(guard) = self.progress.lock() else {
            return;
        };
        if let Some(pb) = guard.as_ref() {
            pb.set_position(progress.percent.clamp(0.0, 100.0) as u64);
            pb.set_message(format!(
                "{} / {} | speed {:.1}x | eta {}",
                format_duration(progress.elapsed_secs),
                format_duration(progress.total_secs),
                progress.speed,
                format_duration(progress.eta.as_secs_f64())
            ));
        }
    }

    fn file_complete(&self, _context: &FileProgressContext, outcome: &ConversionOutcome) {
        self.finish_progress();
        if outcome.succeeded() {
            log::info!("  {} {}", style("✓").green().bold(), outcome.message());
        } else {
            log::info!("  {} {}", style("✗").red().bold(), style(outcome.message()).red());
        }
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        log::info!("{RULE}");
        let line = summary_line(summary);
        if summary.has_failures() {
            log::info!("{}", style(line).red().bold());
        } else {
            log::info!("{}", style(line).bold());
        }
    }

    fn verification_started(&self, dir: &Path, total_files: usize) {
        log::info!("");
        log::info!("Running PowerPoint compatibility check...");
        log::info!("Checking {} files in {}", total_files, dir.display());
    }

    fn verification_file(&self, result: &ComplianceResult) {
        if result.passed {
            log::info!(
                "  {} {} - compatible with PowerPoint",
                style("✓").green().bold(),
                result.file_name
            );
        } else {
            log::info!(
                "  {} {} - {}",
                style("✗").red().bold(),
                result.file_name,
                style("NOT compatible with PowerPoint").red()
            );
            for issue in &result.issues {
                log::info!("      {issue}");
            }
        }
    }

    fn verification_complete(&self, summary: &VerificationSummary) {
        if summary.all_passed() {
            log::info!(
                "{}",
                style("All converted files are PowerPoint-compatible").green().bold()
            );
        } else {
            log::info!(
                "{}",
                style(format!(
                    "Some files are NOT PowerPoint-compatible ({} of {})",
                    summary.failed_count(),
                    summary.results.len()
                ))
                .red()
                .bold()
            );
        }
    }

    fn warning(&self, message: &str) {
        self.finish_progress();
        log::warn!("{}", style(message).yellow());
    }
}
