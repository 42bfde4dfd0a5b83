// ============================================================================
// pptfix-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// The encoder and the prober are black boxes to this crate. Everything that
// starts one of them goes through the traits declared here so the batch
// orchestrator and the verifier can be driven by test doubles.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: encoder process seam (ffmpeg-sidecar)
// - FfprobeExecutor: prober seam (ffprobe crate)
// - build_encode_command: the fixed PowerPoint-compatible argument set
// - check_dependency: `<tool> -version` availability probe

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// FFmpeg argument building for the PowerPoint profile
pub mod ffmpeg;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Test doubles for the spawner and the prober
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{EncodeParams, build_encode_command};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{
    CrateFfprobeExecutor, FfprobeExecutor, StreamAttributes, StreamSelector, VideoProperties,
};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded. Only a failure to
/// start the process counts; the exit status is not inspected.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the command is not on PATH
/// * `CoreError::CommandStart` - the command exists but could not start
pub(crate) fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
