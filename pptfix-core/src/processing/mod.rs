//! Core conversion logic and batch orchestration.
//!
//! Files flow through here in a fixed order: the batch runner discovers
//! them, decides per file whether to skip or convert, and the conversion
//! unit drives one encode from probe to published output.

/// Batch orchestration over a directory of sources
pub mod batch;

/// Single-file conversion with staged failure reporting
pub mod conversion;

/// Downscale policy
pub mod geometry;

/// FFmpeg event handling and progress forwarding
pub mod progress;

pub use batch::{BatchRunner, BatchSummary};
pub use conversion::{
    ConversionFailure, ConversionOutcome, EncodeSettings, FailureStage, convert_file,
};
pub use geometry::{Dimensions, fit_within};
