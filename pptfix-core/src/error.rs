//! Error types for pptfix-core.
//!
//! Only run-level problems are `CoreError`s: bad configuration, a missing
//! input directory or tool, an interrupted run. Failures of a single file
//! are captured as [`crate::processing::ConversionOutcome`] and
//! [`crate::verification::ComplianceResult`] values instead so the batch
//! keeps going.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No input files in: {}", .0.display())]
    NoFilesFound(PathBuf),

    #[error("Required dependency '{0}' not found. Please install it and ensure it's in your PATH.")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, std::io::Error),

    #[error("'{cmd}' exited with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("ffprobe error: {0}")]
    FfprobeParse(String),

    #[error("Video info error: {0}")]
    VideoInfoError(String),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Interrupted by user.")]
    Interrupted,

    #[error("{0}")]
    OperationFailed(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Process exit code for a run that ended with this error.
    ///
    /// `NoFilesFound` is an ordinary "nothing to do" failure (1), an
    /// interrupt follows the shell convention (130), anything else is
    /// fatal (2).
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::NoFilesFound(_) => 1,
            CoreError::Interrupted => 130,
            _ => 2,
        }
    }
}

pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}
