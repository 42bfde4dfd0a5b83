//! PowerPoint compliance checks for produced files.
//!
//! A file is compliant when its first video stream is H.264 High at level
//! 4.1 (4.2 is tolerated, since probers disagree on how they report it) in
//! yuv420p, and its first audio stream is AAC-LC. Probe failures make the
//! file fail; they never abort the scan.

use crate::config::OUTPUT_EXTENSION;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, StreamAttributes, StreamSelector};
use crate::reporting::Reporter;
use crate::temp_files::is_temp_artifact;
use crate::utils::display_name;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

pub const REQUIRED_VIDEO_CODEC: &str = "h264";
pub const REQUIRED_VIDEO_PROFILE: &str = "High";
/// ffprobe reports levels times ten.
pub const ACCEPTED_VIDEO_LEVELS: &[&str] = &["41", "42"];
pub const REQUIRED_PIXEL_FORMAT: &str = "yuv420p";
pub const REQUIRED_AUDIO_CODEC: &str = "aac";
/// Compared after upper-casing the probed value.
pub const REQUIRED_AUDIO_PROFILE: &str = "LC";

/// Probed attributes a compliance decision was based on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceAttributes {
    pub video: StreamAttributes,
    pub audio: StreamAttributes,
}

/// Verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    pub file_name: String,
    pub passed: bool,
    pub attributes: ComplianceAttributes,
    /// One entry per failed rule or probe error; empty when `passed`
    pub issues: Vec<String>,
}

/// Verdicts for a directory, in file name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub directory: PathBuf,
    pub results: Vec<ComplianceResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.failed_count() == 0
    }
}

/// `.mp4` files directly inside `dir`, sorted. Temporary outputs are
/// ignored.
///
/// # Errors
///
/// * `CoreError::DirectoryNotFound` - `dir` does not exist
/// * `CoreError::Walkdir` - `dir` could not be read
pub fn find_verifiable_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CoreError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let path = entry?.into_path();
        let is_mp4 = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(OUTPUT_EXTENSION));
        if path.is_file() && is_mp4 && !is_temp_artifact(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Checks probed attributes against the PowerPoint profile and returns one
/// message per violated rule.
#[must_use]
pub fn check_attributes(video: &StreamAttributes, audio: &StreamAttributes) -> Vec<String> {
    let mut issues = Vec::new();

    expect_exact(&mut issues, StreamSelector::Video, video, "codec_name", REQUIRED_VIDEO_CODEC);
    expect_exact(&mut issues, StreamSelector::Video, video, "profile", REQUIRED_VIDEO_PROFILE);

    let level = video.get("level").map(String::as_str);
    if !level.is_some_and(|l| ACCEPTED_VIDEO_LEVELS.contains(&l)) {
        issues.push(format!(
            "video level is {}, expected one of {}",
            describe(level),
            ACCEPTED_VIDEO_LEVELS.join(", ")
        ));
    }

    expect_exact(&mut issues, StreamSelector::Video, video, "pix_fmt", REQUIRED_PIXEL_FORMAT);
    expect_exact(&mut issues, StreamSelector::Audio, audio, "codec_name", REQUIRED_AUDIO_CODEC);

    let audio_profile = audio.get("profile").map(String::as_str);
    if audio_profile.map(str::to_uppercase).as_deref() != Some(REQUIRED_AUDIO_PROFILE) {
        issues.push(format!(
            "audio profile is {}, expected {}",
            describe(audio_profile),
            REQUIRED_AUDIO_PROFILE
        ));
    }

    issues
}

fn expect_exact(
    issues: &mut Vec<String>,
    selector: StreamSelector,
    attributes: &StreamAttributes,
    name: &str,
    expected: &str,
) {
    let actual = attributes.get(name).map(String::as_str);
    if actual != Some(expected) {
        issues.push(format!("{selector} {name} is {}, expected {expected}", describe(actual)));
    }
}

fn describe(value: Option<&str>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| format!("'{v}'"))
}

/// Probes the first video and audio stream of `path` and checks them.
pub fn verify_file<P: FfprobeExecutor>(prober: &P, path: &Path) -> ComplianceResult {
    let file_name = display_name(path);
    let probed = prober
        .probe_stream(path, StreamSelector::Video)
        .and_then(|video| Ok((video, prober.probe_stream(path, StreamSelector::Audio)?)));

    match probed {
        Ok((video, audio)) => {
            let issues = check_attributes(&video, &audio);
            ComplianceResult {
                file_name,
                passed: issues.is_empty(),
                attributes: ComplianceAttributes { video, audio },
                issues,
            }
        }
        Err(e) => {
            log::debug!("Probe failed for {}: {}", path.display(), e);
            ComplianceResult {
                issues: vec![format!("Error probing {file_name}: {e}")],
                file_name,
                passed: false,
                attributes: ComplianceAttributes::default(),
            }
        }
    }
}

/// Verifies every `.mp4` directly inside `dir`.
///
/// `interrupt` is checked before each file; once set the scan stops.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - ffprobe is missing
/// * `CoreError::DirectoryNotFound` - `dir` does not exist
/// * `CoreError::NoFilesFound` - `dir` holds no `.mp4` files
/// * `CoreError::Interrupted` - the interrupt flag was raised
pub fn verify_directory<P: FfprobeExecutor>(
    prober: &P,
    reporter: &dyn Reporter,
    dir: &Path,
    interrupt: Option<&AtomicBool>,
) -> CoreResult<VerificationSummary> {
    let interrupted = || interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst));

    prober.ensure_available()?;

    let files = find_verifiable_files(dir)?;
    if files.is_empty() {
        return Err(CoreError::NoFilesFound(dir.to_path_buf()));
    }

    reporter.verification_started(dir, files.len());
    let mut summary = VerificationSummary {
        directory: dir.to_path_buf(),
        results: Vec::with_capacity(files.len()),
    };
    for path in &files {
        if interrupted() {
            log::debug!(
                "Interrupt received after checking {} of {} files",
                summary.results.len(),
                files.len()
            );
            return Err(CoreError::Interrupted);
        }
        let result = verify_file(prober, path);
        reporter.verification_file(&result);
        summary.results.push(result);
    }
    // An ffprobe run cut short by Ctrl-C shows up as a failed file; do not report it as one.
    if interrupted() {
        return Err(CoreError::Interrupted);
    }
    reporter.verification_complete(&summary);

    Ok(summary)
}
