// ============================================================================
// pptfix-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for RunConfig
//
// Fluent construction of RunConfig. Every field starts at its documented
// default; build() validates, so an invalid RunConfig is never handed out.

use std::path::PathBuf;

use super::RunConfig;
use crate::error::CoreResult;

/// Builder for [`RunConfig`].
///
/// # Examples
///
/// ```rust
/// use pptfix_core::config::RunConfigBuilder;
///
/// let config = RunConfigBuilder::new()
///     .input_dir("clips")
///     .output_dir("clips/ppt")
///     .recursive(true)
///     .quality(20)
///     .max_resolution(1280, 720)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_width, 1280);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = input_dir.into();
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Sets the x264 CRF. Checked against [`super::QUALITY_RANGE`] in `build`.
    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.config.audio_bitrate = bitrate.into();
        self
    }

    pub fn max_width(mut self, max_width: u32) -> Self {
        self.config.max_width = max_width;
        self
    }

    pub fn max_height(mut self, max_height: u32) -> Self {
        self.config.max_height = max_height;
        self
    }

    pub fn max_resolution(self, max_width: u32, max_height: u32) -> Self {
        self.max_width(max_width).max_height(max_height)
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.quiet = quiet;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<RunConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
