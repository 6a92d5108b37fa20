use crate::RedactedSecret;

/// **VALUE**: Verifies that neither Debug nor Display leak the secret.
///
/// **WHY THIS MATTERS**: Client secrets and private keys pass through structs that get logged
/// with `{:?}`. A leak here ends up in log files on the device.
///
/// **BUG THIS CATCHES**: Would catch a derived Debug replacing the manual implementation.
#[test]
fn given_secret_when_formatted_then_value_is_redacted() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("super-secret-value");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{secret:?}");
    let display = format!("{secret}");

    // THEN: The raw value never appears
    assert!(!debug.contains("super-secret-value"));
    assert!(!display.contains("super-secret-value"));
    assert_eq!(secret.expose(), "super-secret-value");
    assert_eq!(secret.len(), "super-secret-value".len());
}

/// **VALUE**: Verifies that serializing a secret fails instead of writing it out.
///
/// **WHY THIS MATTERS**: Config and credential structs are serde-serializable; an accidental
/// `Serialize` derive on a container must not silently persist the secret.
///
/// **BUG THIS CATCHES**: Would catch a Serialize impl that forwards to the inner string.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("do-not-write");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Serialization is refused
    let err = result.expect_err("Secret serialization must fail");
    assert!(err.to_string().contains("cannot be serialized"));
}
