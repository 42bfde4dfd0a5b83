//! Run configuration and process-wide constants.
//!
//! A [`RunConfig`] is created once per run (usually by pptfix-cli through
//! [`RunConfigBuilder`]) and passed by reference to the components that
//! need it. It is validated on construction and never mutated afterwards.

mod builder;

use crate::error::{CoreError, CoreResult};

use std::ops::RangeInclusive;
use std::path::PathBuf;

pub use builder::RunConfigBuilder;

/// Input extensions accepted by discovery (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "avi", "mkv", "wmv", "webm", "mpg", "mpeg", "3gp", "ts",
];

/// Extension of every produced file.
pub const OUTPUT_EXTENSION: &str = "mp4";

pub const DEFAULT_INPUT_DIR: &str = "data/input";
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Default x264 CRF. Lower values produce higher quality but larger files.
pub const DEFAULT_QUALITY: u8 = 22;

/// Accepted CRF values.
pub const QUALITY_RANGE: RangeInclusive<u8> = 18..=35;

pub const DEFAULT_AUDIO_BITRATE: &str = "160k";

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

/// Smallest accepted maximum width or height. 4:2:0 H.264 needs even
/// sizes, so nothing below 2 can be encoded.
pub const MIN_DIMENSION: u32 = 2;

/// Frame rate used when the source does not report one.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory scanned for source videos
    pub input_dir: PathBuf,

    /// Directory receiving the converted `.mp4` files
    pub output_dir: PathBuf,

    /// Scan subdirectories of `input_dir` as well
    pub recursive: bool,

    /// Replace outputs that already exist instead of skipping them
    pub overwrite: bool,

    /// x264 CRF, within [`QUALITY_RANGE`]
    pub quality: u8,

    /// AAC bitrate passed through to ffmpeg (e.g. "160k")
    pub audio_bitrate: String,

    pub max_width: u32,
    pub max_height: u32,

    /// Suppress encoder progress output
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            recursive: false,
            overwrite: false,
            quality: DEFAULT_QUALITY,
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quiet: false,
        }
    }
}

impl RunConfig {
    /// Checks every field that has a constrained domain.
    pub fn validate(&self) -> CoreResult<()> {
        if !QUALITY_RANGE.contains(&self.quality) {
            return Err(CoreError::Config(format!(
                "--crf must be between {} and {} (got {})",
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end(),
                self.quality
            )));
        }

        if self.max_width < MIN_DIMENSION || self.max_height < MIN_DIMENSION {
            return Err(CoreError::Config(format!(
                "Maximum resolution must be at least {MIN_DIMENSION}x{MIN_DIMENSION} (got {}x{})",
                self.max_width, self.max_height
            )));
        }

        if !is_valid_bitrate(&self.audio_bitrate) {
            return Err(CoreError::Config(format!(
                "Invalid audio bitrate '{}' (expected e.g. 128k, 160k, 1M)",
                self.audio_bitrate
            )));
        }

        Ok(())
    }
}

/// Accepts ffmpeg-style bitrates: digits with an optional k/M suffix.
fn is_valid_bitrate(value: &str) -> bool {
    let digits = value
        .strip_suffix(['k', 'K', 'm', 'M'])
        .unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && digits != "0"
}
