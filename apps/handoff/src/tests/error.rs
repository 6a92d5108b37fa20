use crate::error::HandoffAppError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that app errors name their kind and where they were raised.
///
/// **BUG THIS CATCHES**: Would catch a variant whose `#[error]` format drops the location,
/// leaving a one-line console message with nothing to search for.
#[test]
fn given_timeout_error_when_displayed_then_includes_kind_message_and_location() {
    // GIVEN: A timeout raised here
    let err = HandoffAppError::Timeout {
        message: String::from("Initiator did not proceed"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting it
    let text = err.to_string();

    // THEN: Kind, message and file are present
    assert!(text.contains("Timeout Error"));
    assert!(text.contains("Initiator did not proceed"));
    assert!(text.contains("error.rs"));
}

#[test]
fn given_core_error_when_displayed_then_prefixed_as_core() {
    let err = HandoffAppError::Core {
        message: String::from("Config Validation Error: bad"),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().starts_with("Core Error: Config Validation Error: bad"));
}
