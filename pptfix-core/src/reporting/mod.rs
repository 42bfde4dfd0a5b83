//! User-facing reporting for batch runs and verification passes.
//!
//! The core never prints directly. Batch, conversion and verification code
//! call into a [`Reporter`], and the CLI decides whether that means styled
//! terminal lines, JSON lines for a wrapping tool, or nothing at all.

mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::processing::{BatchSummary, ConversionOutcome};
use crate::verification::{ComplianceResult, VerificationSummary};

use std::path::Path;
use std::time::Duration;

/// Batch start metadata.
#[derive(Clone, Debug)]
pub struct BatchStartInfo {
    pub total_files: usize,
    pub input_dir: String,
    pub output_dir: String,
    pub quality: u8,
    pub audio_bitrate: String,
    pub max_width: u32,
    pub max_height: u32,
}

/// Position of the current file within a batch (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileProgressContext {
    pub current_file: usize,
    pub total_files: usize,
}

/// Snapshot of encoder progress for the file in flight.
#[derive(Clone, Debug)]
pub struct ProgressSnapshot {
    pub percent: f32,
    pub elapsed_secs: f64,
    pub total_secs: f64,
    pub speed: f32,
    pub fps: f32,
    pub eta: Duration,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
///
/// Every method defaults to a no-op so implementations only handle what
/// they display.
pub trait Reporter: Send + Sync {
    fn batch_started(&self, _info: &BatchStartInfo) {}
    fn file_skipped(&self, _context: &FileProgressContext, _source_name: &str) {}
    fn file_started(&self, _context: &FileProgressContext, _source_name: &str, _destination_name: &str) {}
    fn encoding_started(&self, _source_name: &str) {}
    fn encoding_progress(&self, _progress: &ProgressSnapshot) {}
    fn file_complete(&self, _context: &FileProgressContext, _outcome: &ConversionOutcome) {}
    fn batch_complete(&self, _summary: &BatchSummary) {}
    fn verification_started(&self, _dir: &Path, _total_files: usize) {}
    fn verification_file(&self, _result: &ComplianceResult) {}
    fn verification_complete(&self, _summary: &VerificationSummary) {}
    fn warning(&self, _message: &str) {}
}

/// No-op reporter that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Separator printed around the per-file lines of a batch.
pub(crate) const RULE: &str =
    "------------------------------------------------------------";

/// One-line summary used by every reporter.
pub(crate) fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "Done. Success: {}, Skipped: {}, Failed: {}",
        summary.succeeded, summary.skipped, summary.failed
    )
}
