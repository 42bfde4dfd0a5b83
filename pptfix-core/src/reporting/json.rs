//! Machine-readable reporter: one JSON object per line.

use super::{BatchStartInfo, FileProgressContext, ProgressSnapshot, Reporter, summary_line};
use crate::processing::{BatchSummary, ConversionOutcome};
use crate::verification::{ComplianceResult, VerificationSummary};

use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON lines reporter for wrapping tools.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<i32>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            last_progress_bucket: Mutex::new(-1),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, mut value: serde_json::Value) {
        if let Some(object) = value.as_object_mut() {
            object.insert("timestamp".to_string(), json!(Self::timestamp()));
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn batch_started(&self, info: &BatchStartInfo) {
        self.write_value(json!({
            "type": "batch_started",
            "total_files": info.total_files,
            "input_dir": info.input_dir,
            "output_dir": info.output_dir,
            "crf": info.quality,
            "audio_bitrate": info.audio_bitrate,
            "max_width": info.max_width,
            "max_height": info.max_height,
        }));
    }

    fn file_skipped(&self, context: &FileProgressContext, source_name: &str) {
        self.write_value(json!({
            "type": "file_skipped",
            "current_file": context.current_file,
            "total_files": context.total_files,
            "source": source_name,
            "reason": "exists",
        }));
    }

    fn file_started(&self, context: &FileProgressContext, source_name: &str, destination_name: &str) {
        self.write_value(json!({
            "type": "file_started",
            "current_file": context.current_file,
            "total_files": context.total_files,
            "source": source_name,
            "destination": destination_name,
        }));
    }

    fn encoding_started(&self, _source_name: &str) {
        if let Ok(mut bucket) = self.last_progress_bucket.lock() {
            *bucket = -1;
        }
    }

    fn encoding_progress(&self, progress: &ProgressSnapshot) {
        // One line per 5% step keeps the stream readable.
        let bucket = (progress.percent as i32) / 5;
        {
            let Ok(mut last) = self.last_progress_bucket.lock() else {
                return;
            };
            if bucket <= *last && progress.percent < 99.0 {
                return;
            }
            *last = bucket;
        }

        self.write_value(json!({
            "type": "encoding_progress",
            "percent": progress.percent,
            "elapsed_seconds": progress.elapsed_secs,
            "total_seconds": progress.total_secs,
            "speed": progress.speed,
            "fps": progress.fps,
            "eta_seconds": progress.eta.as_secs(),
        }));
    }

    fn file_complete(&self, context: &FileProgressContext, outcome: &ConversionOutcome) {
        self.write_value(json!({
            "type": "file_complete",
            "current_file": context.current_file,
            "total_files": context.total_files,
            "source": outcome.source_name,
            "destination": outcome.destination_name,
            "success": outcome.succeeded(),
            "failure_stage": outcome.failure_stage(),
            "message": outcome.message(),
        }));
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        self.write_value(json!({
            "type": "batch_complete",
            "succeeded": summary.succeeded,
            "skipped": summary.skipped,
            "failed": summary.failed,
            "message": summary_line(summary),
        }));
    }

    fn verification_started(&self, dir: &Path, total_files: usize) {
        self.write_value(json!({
            "type": "verification_started",
            "directory": dir.display().to_string(),
            "total_files": total_files,
        }));
    }

    fn verification_file(&self, result: &ComplianceResult) {
        self.write_value(json!({
            "type": "verification_file",
            "file": result.file_name,
            "passed": result.passed,
            "attributes": result.attributes,
            "issues": result.issues,
        }));
    }

    fn verification_complete(&self, summary: &VerificationSummary) {
        self.write_value(json!({
            "type": "verification_complete",
            "directory": summary.directory.display().to_string(),
            "passed": summary.passed_count(),
            "failed": summary.failed_count(),
            "all_passed": summary.all_passed(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
        }));
    }
}
