//! Conversion of a single file.
//!
//! A conversion never returns an error to its caller. Whatever goes wrong
//! is classified by the stage it happened in and recorded in the returned
//! [`ConversionOutcome`], so one bad clip cannot stop a batch.

use crate::config::{FALLBACK_FRAME_RATE, RunConfig};
use crate::external::{EncodeParams, FfmpegProcess, FfmpegSpawner, FfprobeExecutor, build_encode_command};
use crate::processing::geometry::{Dimensions, fit_within};
use crate::processing::progress::FfmpegProgressHandler;
use crate::reporting::Reporter;
use crate::temp_files::create_temp_output;
use crate::utils::display_name;

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tempfile::TempPath;

/// Stage of a conversion that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Source could not be opened or probed. No temp file was created.
    Open,
    /// The encoder failed. The temp file has been removed.
    Convert,
    /// Publishing the temp file failed. The temp file is left on disk.
    Finalize,
}

impl FailureStage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FailureStage::Open => "open-failed",
            FailureStage::Convert => "convert-failed",
            FailureStage::Finalize => "finalize-failed",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub stage: FailureStage,
    pub reason: String,
}

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub source_name: String,
    pub destination_name: String,
    pub result: Result<(), ConversionFailure>,
}

impl ConversionOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn failure_stage(&self) -> Option<FailureStage> {
        self.result.as_ref().err().map(|f| f.stage)
    }

    /// Status line, e.g. `ok: a.mov -> a.mp4` or `convert-failed: a.mov (reason)`.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.result {
            Ok(()) => format!("ok: {} -> {}", self.source_name, self.destination_name),
            Err(failure) => format!("{}: {} ({})", failure.stage, self.source_name, failure.reason),
        }
    }
}

/// Codec-independent knobs of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub quality: u8,
    pub audio_bitrate: String,
    pub max_width: u32,
    pub max_height: u32,
    /// Suppresses encoder progress reporting
    pub quiet: bool,
}

impl From<&RunConfig> for EncodeSettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            quality: config.quality,
            audio_bitrate: config.audio_bitrate.clone(),
            max_width: config.max_width,
            max_height: config.max_height,
            quiet: config.quiet,
        }
    }
}

/// Converts `source` into a PowerPoint-compatible MP4 at `destination`.
///
/// The encoder writes to a temporary sibling of `destination`. On success
/// any existing destination is removed and the temporary file renamed onto
/// it. On an encoder failure the temporary file is deleted; on a finalize
/// failure it is kept for inspection.
pub fn convert_file<S, P>(
    spawner: &S,
    prober: &P,
    reporter: &dyn Reporter,
    source: &Path,
    destination: &Path,
    settings: &EncodeSettings,
) -> ConversionOutcome
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    let source_name = display_name(source);
    let destination_name = display_name(destination);
    let outcome = |result: Result<(), ConversionFailure>| ConversionOutcome {
        source_name: source_name.clone(),
        destination_name: destination_name.clone(),
        result,
    };
    let failed = |stage: FailureStage, reason: String| {
        log::debug!("{} for {}: {}", stage, source.display(), reason);
        outcome(Err(ConversionFailure { stage, reason }))
    };

    let properties = match prober.get_video_properties(source) {
        Ok(props) => props,
        Err(e) => return failed(FailureStage::Open, e.to_string()),
    };

    let natural = Dimensions::new(properties.width, properties.height);
    let target = fit_within(natural, settings.max_width, settings.max_height);
    let scale = (target != natural).then_some(target);
    if let Some(size) = scale {
        log::debug!("Downscaling {source_name} from {natural} to {size}");
    }

    let frame_rate = properties
        .frame_rate
        .filter(|rate| *rate > 0.0)
        .unwrap_or_else(|| {
            log::debug!("No usable frame rate for {source_name}; using {FALLBACK_FRAME_RATE}");
            FALLBACK_FRAME_RATE
        });

    let temp_output = match create_temp_output(destination) {
        Ok(path) => path,
        Err(e) => return failed(FailureStage::Convert, format!("temporary output: {e}")),
    };

    let params = EncodeParams {
        input_path: source.to_path_buf(),
        output_path: temp_output.to_path_buf(),
        quality: settings.quality,
        audio_bitrate: settings.audio_bitrate.clone(),
        frame_rate,
        scale,
    };

    if !settings.quiet {
        reporter.encoding_started(&source_name);
    }
    if let Err(reason) = run_encode(spawner, reporter, &params, properties.duration_secs, settings.quiet) {
        // Dropping the guard deletes a partially written temp file.
        drop(temp_output);
        return failed(FailureStage::Convert, reason);
    }

    match publish(temp_output, destination) {
        Ok(()) => {
            log::debug!("Published {}", destination.display());
            outcome(Ok(()))
        }
        Err(reason) => failed(FailureStage::Finalize, reason),
    }
}

fn run_encode<S: FfmpegSpawner>(
    spawner: &S,
    reporter: &dyn Reporter,
    params: &EncodeParams,
    duration: Option<f64>,
    quiet: bool,
) -> Result<(), String> {
    let cmd = build_encode_command(params);
    log::debug!("FFmpeg command: {cmd:?}");

    let mut process = spawner.spawn(cmd).map_err(|e| e.to_string())?;
    let mut handler = FfmpegProgressHandler::new(reporter, duration, quiet);
    let events = process.handle_events(|event| handler.handle_event(event));
    let status = process.wait().map_err(|e| e.to_string())?;
    events.map_err(|e| e.to_string())?;

    if status.success() {
        return Ok(());
    }

    if !handler.stderr_buffer().is_empty() {
        log::debug!("ffmpeg stderr for {}:\n{}", params.input_path.display(), handler.stderr_buffer().trim());
    }
    let exit = status
        .code()
        .map_or_else(|| "ffmpeg terminated by signal".to_string(), |code| format!("ffmpeg exited with code {code}"));
    Err(match handler.failure_reason() {
        Some(reason) => format!("{exit}: {reason}"),
        None => exit,
    })
}

/// Removes any existing destination, then renames the temp file onto it.
/// On failure the temp file is kept and its path included in the reason.
fn publish(temp_output: TempPath, destination: &Path) -> Result<(), String> {
    if destination.exists() {
        if let Err(e) = fs::remove_file(destination) {
            let kept = keep_for_inspection(temp_output);
            return Err(format!("cannot remove existing {}: {e}{kept}", destination.display()));
        }
    }

    temp_output.persist(destination).map_err(|e| {
        let kept = keep_for_inspection(e.path);
        format!("cannot rename onto {}: {}{kept}", destination.display(), e.error)
    })
}

fn keep_for_inspection(temp_output: TempPath) -> String {
    match temp_output.keep() {
        Ok(path) if path.exists() => {
            log::warn!("Temporary output left for inspection: {}", path.display());
            format!("; temporary output kept at {}", path.display())
        }
        Ok(_) => String::new(),
        Err(e) => {
            log::warn!("Could not keep temporary output {}: {}", e.path.display(), e.error);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::VideoProperties;
    use crate::external::mocks::{MOCK_OUTPUT_CONTENT, MockFfmpegSpawner, MockFfprobeExecutor};
    use crate::reporting::NullReporter;
    use crate::temp_files::is_temp_artifact;
    use ffmpeg_sidecar::event::FfmpegEvent;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn settings() -> EncodeSettings {
        EncodeSettings::from(&RunConfig::default())
    }

    fn hd_props() -> VideoProperties {
        VideoProperties {
            width: 1920,
            height: 1080,
            frame_rate: Some(25.0),
            duration_secs: Some(10.0),
        }
    }

    fn temp_leftovers(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| is_temp_artifact(p))
            .collect()
    }

    fn arg_after(args: &[String], flag: &str) -> Option<String> {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    }

    #[test]
    fn success_publishes_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.mov");
        let dst = dir.path().join("out").join("a.mp4");
        fs::create_dir_all(dst.parent().unwrap()).unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("libx264", vec![]);
        let prober = MockFfprobeExecutor::new().with_default_properties(hd_props());

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());

        assert!(outcome.succeeded(), "{}", outcome.message());
        assert_eq!(outcome.message(), "ok: a.mov -> a.mp4");
        assert_eq!(fs::read(&dst).unwrap(), MOCK_OUTPUT_CONTENT);
        assert!(temp_leftovers(dst.parent().unwrap()).is_empty());

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(arg_after(&calls[0], "-r").as_deref(), Some("25"));
        assert!(!calls[0].iter().any(|a| a == "-vf"));
        let written_to = calls[0].last().unwrap();
        assert!(written_to.contains("a.pptfix-tmp-"), "{written_to}");
    }

    #[test]
    fn oversized_source_is_scaled_and_rate_falls_back() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("uhd.mkv");
        let dst = dir.path().join("uhd.mp4");

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("libx264", vec![]);
        let prober = MockFfprobeExecutor::new().with_default_properties(VideoProperties {
            width: 3840,
            height: 2160,
            frame_rate: None,
            duration_secs: None,
        });

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());
        assert!(outcome.succeeded());

        let calls = spawner.get_received_calls();
        assert_eq!(arg_after(&calls[0], "-vf").as_deref(), Some("scale=1920:1080"));
        assert_eq!(arg_after(&calls[0], "-r").as_deref(), Some("30"));
    }

    #[test]
    fn probe_failure_is_open_failure_without_encoding() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("broken.avi");
        let dst = dir.path().join("broken.mp4");

        let spawner = MockFfmpegSpawner::new();
        let prober = MockFfprobeExecutor::new();
        prober.expect_video_properties(&src, Err("invalid data found".to_string()));

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());

        assert_eq!(outcome.failure_stage(), Some(FailureStage::Open));
        assert!(outcome.message().starts_with("open-failed: broken.avi ("));
        assert!(outcome.message().contains("invalid data found"));
        assert!(spawner.get_received_calls().is_empty());
        assert!(temp_leftovers(dir.path()).is_empty());
    }

    #[test]
    fn encoder_failure_removes_partial_output() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.mov");
        let dst = dir.path().join("a.mp4");

        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation(
            "libx264",
            vec![FfmpegEvent::Error("Error while decoding stream".to_string())],
            1,
            true,
        );
        let prober = MockFfprobeExecutor::new().with_default_properties(hd_props());

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());

        assert_eq!(outcome.failure_stage(), Some(FailureStage::Convert));
        assert!(outcome.message().contains("Error while decoding stream"), "{}", outcome.message());
        assert!(!dst.exists());
        assert!(temp_leftovers(dir.path()).is_empty());
    }

    #[test]
    fn existing_destination_is_replaced() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.mov");
        let dst = dir.path().join("a.mp4");
        fs::write(&dst, b"stale").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("libx264", vec![]);
        let prober = MockFfprobeExecutor::new().with_default_properties(hd_props());

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());

        assert!(outcome.succeeded());
        assert_eq!(fs::read(&dst).unwrap(), MOCK_OUTPUT_CONTENT);
    }

    #[test]
    fn missing_encoder_output_is_finalize_failure() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.mov");
        let dst = dir.path().join("a.mp4");

        // Exit code 0 without writing anything.
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("libx264", vec![], 0, false);
        let prober = MockFfprobeExecutor::new().with_default_properties(hd_props());

        let outcome = convert_file(&spawner, &prober, &NullReporter, &src, &dst, &settings());

        assert_eq!(outcome.failure_stage(), Some(FailureStage::Finalize));
        assert!(outcome.message().starts_with("finalize-failed: a.mov ("));
        assert!(!dst.exists());
    }

    #[test]
    fn stage_labels() {
        assert_eq!(FailureStage::Open.to_string(), "open-failed");
        assert_eq!(FailureStage::Convert.to_string(), "convert-failed");
        assert_eq!(FailureStage::Finalize.to_string(), "finalize-failed");
    }
}
