// pptfix-cli/src/main.rs
//
// Entry point for the pptfix binary.
//
// Responsibilities:
// - Parsing arguments (clap exits with status 2 on usage errors).
// - Setting up logging to the console and, optionally, a log file.
// - Installing the Ctrl-C handler that stops a batch before its next file.
// - Dispatching to the convert or verify command (convert when none is given).
// - Mapping the outcome onto the process exit status.

use clap::Parser;
use pptfix_cli::logging::init_logging;
use pptfix_cli::{Cli, Commands, report_and_exit_code, run_convert, run_verify};

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("Critical error: {e}");
        return ExitCode::from(e.exit_code());
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupt);
    // ffmpeg shares the process group and stops on its own; the batch only
    // has to avoid starting the next file.
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let command = match cli.command_or_default() {
        Ok(command) => command,
        Err(e) => e.exit(),
    };
    let result = match command {
        Commands::Convert(args) => run_convert(args, interrupt),
        Commands::Verify(args) => run_verify(args, interrupt),
    };

    ExitCode::from(report_and_exit_code(&result))
}
