//! Implementation of the 'verify' subcommand.

use super::make_reporter;
use crate::cli::VerifyArgs;
use crate::error::{CliResult, EXIT_FAILURES, EXIT_SUCCESS};

use pptfix_core::{CoreError, CrateFfprobeExecutor, FfprobeExecutor, Reporter, verify_directory};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Checks every .mp4 in the output directory. Exits non-zero when any file
/// fails or there is nothing to check.
pub fn run_verify(args: VerifyArgs, interrupt: Arc<AtomicBool>) -> CliResult<u8> {
    let reporter = make_reporter(args.progress_json);
    verify_with(
        &CrateFfprobeExecutor::new(),
        reporter.as_ref(),
        &args.output_dir,
        Some(&interrupt),
    )
}

pub(crate) fn verify_with<P: FfprobeExecutor>(
    prober: &P,
    reporter: &dyn Reporter,
    dir: &Path,
    interrupt: Option<&AtomicBool>,
) -> CliResult<u8> {
    match verify_directory(prober, reporter, dir, interrupt) {
        Ok(summary) if summary.all_passed() => Ok(EXIT_SUCCESS),
        Ok(_) => Ok(EXIT_FAILURES),
        Err(CoreError::NoFilesFound(dir)) => {
            reporter.warning(&format!("No MP4 files found in {}", dir.display()));
            Ok(EXIT_FAILURES)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptfix_core::JsonReporter;
    use pptfix_core::external::StreamSelector;
    use pptfix_core::external::mocks::MockFfprobeExecutor;
    use std::fs;
    use std::io::{self, Write};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn empty_directory_warns_as_json() {
        let dir = tempdir().unwrap();
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));

        let code = verify_with(&MockFfprobeExecutor::new(), &reporter, dir.path(), None).unwrap();

        assert_eq!(code, EXIT_FAILURES);
        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "warning");
        assert!(lines[0]["message"].as_str().unwrap().starts_with("No MP4 files found in"));
    }

    #[test]
    fn interrupt_is_passed_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.mp4");
        fs::write(&path, b"mp4").unwrap();
        let prober = MockFfprobeExecutor::new();
        prober.expect_stream_attributes(&path, StreamSelector::Video, &[("codec_name", "h264")]);
        let flag = AtomicBool::new(true);

        let result = verify_with(&prober, &pptfix_core::NullReporter, dir.path(), Some(&flag));

        assert!(matches!(result, Err(CoreError::Interrupted)));
        assert!(prober.get_probe_calls().is_empty());
    }
}
