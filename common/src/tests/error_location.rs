use crate::ErrorLocation;

/// **VALUE**: Verifies that `ErrorLocation::here()` points at the calling line, not at itself.
///
/// **WHY THIS MATTERS**: Every error in the workspace records where it was raised. If `here()`
/// lost `#[track_caller]`, all errors would report `error_location.rs` as their origin.
///
/// **BUG THIS CATCHES**: Would catch removal of `#[track_caller]` from `here()`.
#[test]
fn given_two_call_sites_when_here_called_then_lines_differ_and_file_is_caller() {
    // GIVEN / WHEN: Capturing locations on consecutive lines
    let first = ErrorLocation::here();
    let second = ErrorLocation::here();

    // THEN: Both point at this test file on consecutive lines
    assert!(first.file.contains("tests"), "Should capture the caller's file");
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
    assert!(first.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the `[file:line:column]` display format.
///
/// **WHY THIS MATTERS**: Error messages across the workspace append this suffix; a format
/// change breaks log parsing and the error display tests in `handoff-core`.
///
/// **BUG THIS CATCHES**: Would catch a Display implementation that drops brackets or fields.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::here();

    // WHEN: Formatting as string
    let formatted = location.to_string();

    // THEN: Should produce "[file:line:column]"
    assert!(formatted.starts_with('['));
    assert!(formatted.ends_with(']'));
    assert!(formatted.contains(&format!(":{}:", location.line)));
    assert_eq!(formatted.matches(':').count(), 2, "Should have exactly 2 colons");
}
