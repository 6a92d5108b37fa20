use handoff_core::error::{CoreError, ListenerError, TransportError};
use handoff_core::renderer::HandoffErrorCode;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};

/// **VALUE**: Verifies that I/O errors converted with `?` point at the conversion site.
///
/// **WHY THIS MATTERS**: Rendezvous failures happen deep in async workers. Without the
/// location, a log line says "connection reset" and nothing about where.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from the `From` impl,
/// which would make every location point into the error module.
#[test]
fn given_io_error_when_converted_then_location_is_call_site() {
    // GIVEN: An I/O error
    let io_error = IoError::new(ErrorKind::ConnectionReset, "connection reset");

    // WHEN: Converting into a listener error
    let error: ListenerError = io_error.into();

    // THEN: Message and this file are in the display
    let text = error.to_string();
    assert!(text.contains("IO Error"));
    assert!(text.contains("connection reset"));
    assert!(text.contains("error.rs"));
    assert!(!text.contains("listener.rs"));
}

#[test]
fn given_construction_error_when_wrapped_in_core_error_then_display_and_source_preserved() {
    let error = TransportError::construction("Unable to build chain verifier", "no roots");
    let expected = error.to_string();

    let core: CoreError = error.into();

    assert_eq!(core.to_string(), expected);
    assert!(expected.contains("Transport Construction Failed"));
    assert!(expected.contains("error.rs"));
    assert!(core.source().is_some());
}

#[test]
fn given_error_codes_when_displayed_then_include_numeric_code() {
    let cases = [
        (HandoffErrorCode::BroadcastUnavailable, 100),
        (HandoffErrorCode::ListenerUnavailable, 101),
        (HandoffErrorCode::ListenerBindFailed, 102),
    ];

    for (code, number) in cases {
        assert_eq!(code.code(), number);
        assert!(code.to_string().contains(&format!("({number})")));
    }
}
