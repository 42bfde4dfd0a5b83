//! Batch orchestration: discovery, skip/convert decisions and tallying.

use crate::config::RunConfig;
use crate::discovery::find_processable_files;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::processing::conversion::{ConversionOutcome, EncodeSettings, convert_file};
use crate::reporting::{BatchStartInfo, FileProgressContext, Reporter};
use crate::temp_files::sweep_orphaned_temp_files;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tally of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Outcomes of the files that were converted (or attempted), in order
    pub outcomes: Vec<ConversionOutcome>,
}

impl BatchSummary {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, outcome: ConversionOutcome) {
        if outcome.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Runs a batch of conversions strictly one file after another.
pub struct BatchRunner<S: FfmpegSpawner, P: FfprobeExecutor> {
    spawner: S,
    prober: P,
    reporter: Arc<dyn Reporter>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> BatchRunner<S, P> {
    pub fn new(spawner: S, prober: P, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            spawner,
            prober,
            reporter,
            interrupt: None,
        }
    }

    /// Flag checked before each file; once set the batch stops with
    /// `CoreError::Interrupted`.
    #[must_use]
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Converts every supported file under `config.input_dir`.
    ///
    /// Per-file failures are counted in the summary and never abort the
    /// batch. Files finalized before an interrupt stay in place.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` - `config` does not validate
    /// * `CoreError::DependencyNotFound` - ffmpeg or ffprobe is missing
    /// * `CoreError::DirectoryNotFound` - the input directory is missing
    /// * `CoreError::NoFilesFound` - nothing to convert
    /// * `CoreError::Interrupted` - the interrupt flag was raised
    /// * `CoreError::Io` - the output directory could not be created
    pub fn run(&self, config: &RunConfig) -> CoreResult<BatchSummary> {
        config.validate()?;
        self.spawner.ensure_available()?;
        self.prober.ensure_available()?;

        fs::create_dir_all(&config.output_dir)?;
        for removed in sweep_orphaned_temp_files(&config.output_dir)? {
            self.reporter.warning(&format!(
                "Removed leftover temporary file from an earlier run: {}",
                removed.display()
            ));
        }

        let files = find_processable_files(&config.input_dir, config.recursive)?;
        if files.is_empty() {
            return Err(CoreError::NoFilesFound(config.input_dir.clone()));
        }
        log::debug!("Discovered {} file(s) in {}", files.len(), config.input_dir.display());

        self.reporter.batch_started(&BatchStartInfo {
            total_files: files.len(),
            input_dir: resolved(&config.input_dir),
            output_dir: resolved(&config.output_dir),
            quality: config.quality,
            audio_bitrate: config.audio_bitrate.clone(),
            max_width: config.max_width,
            max_height: config.max_height,
        });

        let settings = EncodeSettings::from(config);
        let mut summary = BatchSummary::default();

        for (index, file) in files.iter().enumerate() {
            if self.interrupted() {
                log::debug!(
                    "Interrupt received after {} of {} files",
                    index,
                    files.len()
                );
                return Err(CoreError::Interrupted);
            }

            let context = FileProgressContext {
                current_file: index + 1,
                total_files: files.len(),
            };
            let destination = file.output_path(&config.output_dir);

            if destination.exists() && !config.overwrite {
                self.reporter.file_skipped(&context, &file.file_name());
                summary.skipped += 1;
                continue;
            }

            self.reporter.file_started(
                &context,
                &file.file_name(),
                &crate::utils::display_name(&destination),
            );
            let outcome = convert_file(
                &self.spawner,
                &self.prober,
                self.reporter.as_ref(),
                &file.path,
                &destination,
                &settings,
            );
            self.reporter.file_complete(&context, &outcome);
            summary.record(outcome);
        }

        // An interrupt during the last encode still ends the run as interrupted.
        if self.interrupted() {
            return Err(CoreError::Interrupted);
        }

        self.reporter.batch_complete(&summary);
        Ok(summary)
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Absolute form of `path` for display; falls back to the path as given.
fn resolved(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfigBuilder;
    use crate::external::VideoProperties;
    use crate::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor};
    use crate::reporting::NullReporter;
    use tempfile::tempdir;

    fn props() -> VideoProperties {
        VideoProperties {
            width: 1280,
            height: 720,
            frame_rate: Some(30.0),
            duration_secs: Some(5.0),
        }
    }

    #[test]
    fn summary_counts() {
        let mut summary = BatchSummary::default();
        assert!(!summary.has_failures());
        summary.skipped = 1;
        assert!(!summary.has_failures());
        summary.failed = 1;
        assert!(summary.has_failures());
    }

    #[test]
    fn invalid_config_fails_before_touching_disk() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        let config = RunConfig {
            input_dir: dir.path().to_path_buf(),
            output_dir: output.clone(),
            quality: 40,
            ..RunConfig::default()
        };

        let runner = BatchRunner::new(
            MockFfmpegSpawner::new(),
            MockFfprobeExecutor::new(),
            Arc::new(NullReporter),
        );
        let err = runner.run(&config).unwrap_err();

        assert!(matches!(err, CoreError::Config(_)));
        assert!(!output.exists());
    }

    #[test]
    fn interrupt_stops_before_next_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.mov"), b"x").unwrap();
        let config = RunConfigBuilder::new()
            .input_dir(&input)
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap();

        let spawner = MockFfmpegSpawner::new();
        let flag = Arc::new(AtomicBool::new(true));
        let runner = BatchRunner::new(
            spawner.clone(),
            MockFfprobeExecutor::new().with_default_properties(props()),
            Arc::new(NullReporter),
        )
        .with_interrupt_flag(flag);

        let err = runner.run(&config).unwrap_err();
        assert!(matches!(err, CoreError::Interrupted));
        assert!(spawner.get_received_calls().is_empty());
    }
}
