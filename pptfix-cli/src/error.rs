// ============================================================================
// pptfix-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: result alias and exit status mapping
//
// Commands return CliResult<u8>: Ok carries the exit status of a run that
// completed (0 clean, 1 with failures), Err a run-level CoreError whose
// exit status comes from CoreError::exit_code.

use pptfix_core::{CoreError, CoreResult};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Exit status of a run that completed without failures.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status of a run in which at least one file failed.
pub const EXIT_FAILURES: u8 = 1;

/// Exit status for `result`, reporting errors the way the user sees them.
///
/// Interrupts and "nothing to do" print a plain notice, anything else is a
/// critical error. All of them go to stderr, leaving stdout to the reporter.
pub fn report_and_exit_code(result: &CliResult<u8>) -> u8 {
    match result {
        Ok(code) => *code,
        Err(e @ CoreError::Interrupted) => {
            log::warn!("{e}");
            e.exit_code()
        }
        Err(e @ CoreError::NoFilesFound(_)) => {
            log::warn!("{e}");
            e.exit_code()
        }
        Err(e) => {
            log::error!("Critical error: {e}");
            e.exit_code()
        }
    }
}
