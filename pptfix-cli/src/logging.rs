// ============================================================================
// pptfix-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch for console and optional log file
//
// Console lines are printed without decoration: info and below go to
// stdout, warnings and errors to stderr. When a log directory is given, a
// file named pptfix_run_<timestamp>.log receives every line with a
// timestamp and level, ANSI styling stripped.

use pptfix_core::{CoreError, CoreResult};

use log::{Level, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("pptfix_run_{}.log", pptfix_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("pptfix_run_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Installs the global logger.
///
/// Returns the path of the log file when `log_dir` was given.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CoreResult<Option<PathBuf>> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() <= Level::Info {
                out.finish(format_args!("{message}"));
            } else {
                out.finish(format_args!("[{}] {}", record.level(), message));
            }
        })
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| metadata.level() <= Level::Warn)
                .chain(std::io::stderr()),
        )
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| metadata.level() > Level::Warn)
                .chain(std::io::stdout()),
        );

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // Per-line ffmpeg output is only interesting when debugging.
        .level_for("ffmpeg_log", if verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| {
                CoreError::PathError(format!(
                    "Failed to create log directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
            let path = dir.join(format!("pptfix_run_{}.log", get_timestamp()));
            let file = fern::log_file(&path)?;
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        let text = message.to_string();
                        out.finish(format_args!(
                            "[{}][{}] {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            console::strip_ansi_codes(&text)
                        ));
                    })
                    .chain(file),
            );
            Some(path)
        }
        None => None,
    };

    dispatch
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;

    if let Some(path) = &log_path {
        log::debug!("Logging to {}", path.display());
    }
    Ok(log_path)
}
