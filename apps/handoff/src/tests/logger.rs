// Unit tests for logger initialization
// The global logger can only be installed once per process, so these run serially

use crate::error::HandoffAppError;
use crate::logger::{LOG_FILE_NAME, initialize};

use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies that a bad log directory is an error, and that a later call with a
/// good directory is still safe.
///
/// **WHY THIS MATTERS**: The host initializes logging before anything else. A panic here
/// kills the app before it can report why; a second call (tests, restarts of the demo flow)
/// must not try to install a second global logger.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped, or the `Once` /
/// `AtomicBool` guards being removed so fern fails on the second `apply()`.
#[test]
#[serial]
fn given_unwritable_log_dir_when_initialized_then_error_and_later_calls_ok() {
    // GIVEN: A path that can never hold a log file, and a valid one
    let invalid_dir = PathBuf::from("/dev/null/handoff-logs");
    let valid_dir = TempDir::new().expect("temp dir");

    // WHEN: Initializing with the bad path first, then the good one
    let first = initialize(&invalid_dir);
    let second = initialize(valid_dir.path());

    // THEN: First fails with an app error, second is a no-op
    assert!(matches!(first, Err(HandoffAppError::Handoff { .. })));
    assert!(first.is_err_and(|e| e.to_string().contains("log file")));
    assert!(second.is_ok(), "Repeated initialization should be idempotent");
    assert!(!valid_dir.path().join(LOG_FILE_NAME).exists());
}
