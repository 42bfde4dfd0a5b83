//! FFmpeg event handling for a single encode.
//!
//! Turns the sidecar event stream into reporter progress updates and keeps
//! the encoder's error output so a failed encode can say why it failed.

use crate::error::CoreResult;
use crate::reporting::{ProgressSnapshot, Reporter};
use crate::utils::{format_duration, parse_ffmpeg_time};

use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::time::Duration;

/// Minimum percentage step between two progress updates.
const PROGRESS_STEP: f64 = 1.0;

/// Handler for `FFmpeg` events of one encode.
pub struct FfmpegProgressHandler<'a> {
    reporter: &'a dyn Reporter,
    duration: Option<f64>,
    quiet: bool,
    last_progress_percent: f64,
    stderr_buffer: String,
    last_log_line: Option<String>,
}

impl<'a> FfmpegProgressHandler<'a> {
    /// `duration` is the probed source duration; without it no percentage
    /// can be computed and progress is not reported.
    pub fn new(reporter: &'a dyn Reporter, duration: Option<f64>, quiet: bool) -> Self {
        Self {
            reporter,
            duration: duration.filter(|d| *d > 0.0),
            quiet,
            last_progress_percent: -PROGRESS_STEP,
            stderr_buffer: String::new(),
            last_log_line: None,
        }
    }

    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Error output collected so far, one line per message.
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    /// Short reason for a failed encode: the last error line, or the last
    /// log line when ffmpeg reported no error explicitly.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        self.stderr_buffer
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .or_else(|| self.last_log_line.clone())
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        if self.quiet {
            return;
        }
        let Some(total) = self.duration else {
            return;
        };

        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
        let percent = (current_secs / total * 100.0).clamp(0.0, 100.0);

        if percent >= self.last_progress_percent + PROGRESS_STEP
            || (percent >= 100.0 && self.last_progress_percent < 100.0)
        {
            let eta = calculate_eta(total, current_secs, progress.speed);
            log::debug!(
                "Encoding progress: {:.1}% | {} / {} | speed {:.2}x | eta {}",
                percent,
                format_duration(current_secs),
                format_duration(total),
                progress.speed,
                format_duration(eta.as_secs_f64())
            );
            self.reporter.encoding_progress(&ProgressSnapshot {
                percent: percent as f32,
                elapsed_secs: current_secs,
                total_secs: total,
                speed: progress.speed,
                fps: progress.fps,
                eta,
            });
            self.last_progress_percent = percent;
        }
    }

    fn handle_log(&mut self, level: FfmpegLogLevel, message: &str) {
        match level {
            FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => {
                log::debug!(target: "ffmpeg_log", "{message}");
                self.push_stderr(message);
            }
            FfmpegLogLevel::Warning => log::debug!(target: "ffmpeg_log", "{message}"),
            _ => log::trace!(target: "ffmpeg_log", "{message}"),
        }
        if !message.trim().is_empty() {
            self.last_log_line = Some(message.trim().to_string());
        }
    }

    fn handle_error(&mut self, error: &str) {
        log::debug!("ffmpeg stderr error: {error}");
        self.push_stderr(error);
    }

    fn push_stderr(&mut self, line: &str) {
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }
}

fn calculate_eta(total: f64, current_secs: f64, speed: f32) -> Duration {
    if speed > 0.01 && total > current_secs {
        Duration::from_secs_f64((total - current_secs) / f64::from(speed))
    } else {
        Duration::ZERO
    }
}
