use handoff_core::config::HandoffConfig;
use handoff_core::error::ConfigError;
use handoff_core::transport::TlsProtocols;
use handoff_core::{DEFAULT_SERVICE_NAME, HANDOFF_MIME_TYPE};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tempfile::TempDir;

#[test]
fn given_missing_config_file_when_loaded_then_defaults() {
    let dir = TempDir::new().expect("temp dir");

    let config = HandoffConfig::load(dir.path()).expect("loads");

    assert_eq!(config, HandoffConfig::default());
    assert_eq!(config.listener.service_name, DEFAULT_SERVICE_NAME);
    assert_eq!(config.broadcast.mime_type, HANDOFF_MIME_TYPE);
    assert_eq!(config.transport.protocols, TlsProtocols::Tls12And13);
}

/// **VALUE**: Verifies that a saved config loads back unchanged.
///
/// **WHY THIS MATTERS**: The host writes the config once and reads it on every start. A
/// field that does not round-trip silently reverts to its default.
///
/// **BUG THIS CATCHES**: Would catch a missing serde attribute or a rename that drops a
/// section on save.
#[test]
fn given_saved_config_when_loaded_then_identical() {
    // GIVEN: A customised config saved to disk
    let dir = TempDir::new().expect("temp dir");
    let mut config = HandoffConfig::default();
    config.listener.service_name = "KioskRenderer".to_string();
    config.listener.bind_address = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    config.listener.discriminator_timeout_ms = 750;
    config.transport.protocols = TlsProtocols::Tls13Only;
    config.save(dir.path()).expect("saves");

    // WHEN: Loading it
    let loaded = HandoffConfig::load(dir.path()).expect("loads");

    // THEN: Nothing changed and no temp file is left behind
    assert_eq!(loaded, config);
    assert_eq!(loaded.listener.discriminator_timeout(), Duration::from_millis(750));
    assert!(!dir.path().join("handoff.json.tmp").exists());
}

#[test]
fn given_partial_config_file_when_loaded_then_missing_sections_defaulted() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("handoff.json"),
        r#"{"listener":{"service_name":"Lobby"}}"#,
    )
    .expect("writes");

    let config = HandoffConfig::load(dir.path()).expect("loads");

    assert_eq!(config.listener.service_name, "Lobby");
    assert_eq!(config.broadcast.mime_type, HANDOFF_MIME_TYPE);
    assert_eq!(config.version, 1);
}

#[test]
fn given_corrupt_config_file_when_loaded_then_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("handoff.json"), "{ not json").expect("writes");

    let result = HandoffConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies that invalid values are refused before anything is written.
///
/// **BUG THIS CATCHES**: Would catch `save()` writing first and validating later, leaving a
/// config on disk that the next `load()` rejects.
#[test]
fn given_invalid_config_when_saved_then_validation_error_and_no_file() {
    // GIVEN: A config with a zero discriminator timeout
    let dir = TempDir::new().expect("temp dir");
    let mut config = HandoffConfig::default();
    config.listener.discriminator_timeout_ms = 0;

    // WHEN: Saving it
    let result = config.save(dir.path());

    // THEN: Rejected, nothing written
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    assert!(!dir.path().join("handoff.json").exists());
}

#[test]
fn given_invalid_values_when_validated_then_each_rejected() {
    let mut blank_name = HandoffConfig::default();
    blank_name.listener.service_name = "  ".to_string();

    let mut bad_mime = HandoffConfig::default();
    bad_mime.broadcast.mime_type = "beam".to_string();

    let mut future_version = HandoffConfig::default();
    future_version.version = 99;

    for config in [blank_name, bad_mime, future_version] {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "{config:?} should be rejected"
        );
    }
}
