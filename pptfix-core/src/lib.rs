//! Core library for re-encoding videos into a PowerPoint-compatible MP4
//! profile (H.264 High@4.1, yuv420p, AAC-LC) and verifying the results.
//!
//! The encoding itself is delegated to ffmpeg and the inspection to
//! ffprobe; this crate decides what to encode, how to name and publish the
//! output, and whether the result meets the profile.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pptfix_core::{
//!     BatchRunner, CrateFfprobeExecutor, RunConfigBuilder, SidecarSpawner, TerminalReporter,
//!     verify_directory,
//! };
//! use std::sync::Arc;
//!
//! let config = RunConfigBuilder::new()
//!     .input_dir("data/input")
//!     .output_dir("data/output")
//!     .quality(22)
//!     .build()
//!     .unwrap();
//!
//! let reporter = Arc::new(TerminalReporter::new());
//! let runner = BatchRunner::new(SidecarSpawner, CrateFfprobeExecutor::new(), reporter.clone());
//! let summary = runner.run(&config).unwrap();
//!
//! let report =
//!     verify_directory(&CrateFfprobeExecutor::new(), reporter.as_ref(), &config.output_dir, None)
//!         .unwrap();
//! println!("{} failed, {} non-compliant", summary.failed, report.failed_count());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod processing;
pub mod reporting;
pub mod temp_files;
pub mod utils;
pub mod verification;

// Re-exports for public API
pub use config::{RunConfig, RunConfigBuilder};
pub use discovery::{SourceFile, find_processable_files, output_path_for};
pub use error::{CoreError, CoreResult};
pub use external::{CrateFfprobeExecutor, FfmpegSpawner, FfprobeExecutor, SidecarSpawner};
pub use processing::{
    BatchRunner, BatchSummary, ConversionOutcome, Dimensions, EncodeSettings, FailureStage,
    convert_file, fit_within,
};
pub use reporting::{JsonReporter, NullReporter, Reporter, TerminalReporter};
pub use utils::{format_duration, parse_ffmpeg_time};
pub use verification::{
    ComplianceResult, VerificationSummary, check_attributes, verify_directory, verify_file,
};
