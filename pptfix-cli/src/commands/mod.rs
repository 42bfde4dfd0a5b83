//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `convert` command.
/// Re-encodes a directory of videos and checks the results.
pub mod convert;

/// Module containing the implementation of the `verify` command.
pub mod verify;

use pptfix_core::{JsonReporter, Reporter, TerminalReporter};
use std::sync::Arc;

/// Reporter selected by the `--progress-json` flag.
pub(crate) fn make_reporter(progress_json: bool) -> Arc<dyn Reporter> {
    if progress_json {
        Arc::new(JsonReporter::new())
    } else {
        Arc::new(TerminalReporter::new())
    }
}
