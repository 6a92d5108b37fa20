use crate::broadcast::BroadcastMessage;
use crate::descriptor::{
    ADDRESS_FIELD, HandoffDescriptor, HandoffDescriptorBuilder, PROVIDER_URL_FIELD, UUID_FIELD,
};
use crate::error::descriptor::DescriptorError;
use crate::session::SessionIdentifier;
use crate::HANDOFF_MIME_TYPE;

use serde_json::Value;

fn descriptor(address: Option<&str>) -> HandoffDescriptor {
    HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("https://svc.example")
        .with_optional_address(address.map(String::from))
        .build()
        .expect("valid descriptor")
}

/// **VALUE**: Verifies the JSON keys peers rely on.
///
/// **WHY THIS MATTERS**: Responders on other devices parse these exact keys. Renaming a
/// struct field must not silently change the wire format.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[serde(rename = "uuid")]` or a renamed
/// `provider_url` field.
#[test]
fn given_descriptor_with_address_when_serialized_then_uses_wire_keys() {
    // GIVEN: A descriptor with a listener address
    let descriptor = descriptor(Some("AA:BB:CC:DD:EE:FF"));

    // WHEN: Serializing to JSON
    let json = descriptor.to_json().expect("serializes");
    let value: Value = serde_json::from_str(&json).expect("valid JSON");

    // THEN: All three wire keys carry the expected values
    assert_eq!(
        value[UUID_FIELD].as_str(),
        Some(descriptor.session().to_string().as_str())
    );
    assert_eq!(value[PROVIDER_URL_FIELD].as_str(), Some("https://svc.example/"));
    assert_eq!(value[ADDRESS_FIELD].as_str(), Some("AA:BB:CC:DD:EE:FF"));
}

/// **VALUE**: Verifies that a provider URL received without a path is normalised.
///
/// **WHY THIS MATTERS**: Peers may send the URL exactly as their host configured it. The
/// decoded descriptor must still compare equal to one built locally from the same provider.
///
/// **BUG THIS CATCHES**: Would catch the URL being kept as a raw string, making
/// `https://svc.example` and `https://svc.example/` look like different providers.
#[test]
fn given_provider_url_without_path_when_decoded_then_normalised_with_trailing_slash() {
    // GIVEN: A record whose provider URL has no path
    let session = SessionIdentifier::generate();
    let json = format!(r#"{{"uuid":"{session}","provider_url":"https://svc.example"}}"#);

    // WHEN: Decoding and encoding again
    let parsed = HandoffDescriptor::from_json(&json).expect("parses");
    let reencoded: Value =
        serde_json::from_str(&parsed.to_json().expect("serializes")).expect("valid JSON");

    // THEN: The URL carries the root path both ways
    assert_eq!(parsed.provider_url().as_str(), "https://svc.example/");
    assert_eq!(
        reencoded[PROVIDER_URL_FIELD].as_str(),
        Some("https://svc.example/")
    );
}

/// **VALUE**: Verifies that degraded mode leaves `address` out entirely.
///
/// **WHY THIS MATTERS**: A responder treats a missing address as "no live pairing" and
/// falls back to polling. An empty or null address would send it dialling nowhere.
///
/// **BUG THIS CATCHES**: Would catch removal of `skip_serializing_if` on the address.
#[test]
fn given_descriptor_without_address_when_serialized_then_address_key_absent() {
    // GIVEN: A degraded descriptor
    let descriptor = descriptor(None);

    // WHEN: Serializing and reading back
    let json = descriptor.to_json().expect("serializes");
    let value: Value = serde_json::from_str(&json).expect("valid JSON");
    let parsed = HandoffDescriptor::from_json(&json).expect("parses");

    // THEN: No address key, and parsing yields no address
    assert!(value.get(ADDRESS_FIELD).is_none());
    assert_eq!(parsed.address(), None);
    assert_eq!(parsed, descriptor);
}

#[test]
fn given_non_http_provider_url_when_built_then_validation_error() {
    let result = HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("ftp://svc.example")
        .build();

    assert!(matches!(result, Err(DescriptorError::Validation { .. })));
}

#[test]
fn given_blank_address_when_built_then_validation_error() {
    let result = HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("https://svc.example")
        .with_address("   ")
        .build();

    assert!(matches!(result, Err(DescriptorError::Validation { .. })));
}

#[test]
fn given_missing_session_when_built_then_validation_error() {
    let result = HandoffDescriptorBuilder::default()
        .with_provider_url("https://svc.example")
        .build();

    assert!(matches!(result, Err(DescriptorError::Validation { .. })));
}

/// **VALUE**: Verifies that records of another type are refused before parsing.
///
/// **BUG THIS CATCHES**: Would catch a responder that parses any JSON record it sees,
/// including unrelated records that happen to share field names.
#[test]
fn given_foreign_mime_type_when_decoded_then_unsupported_mime_type() {
    // GIVEN: A valid payload under the wrong MIME type
    let json = descriptor(None).to_json().expect("serializes");
    let message = BroadcastMessage::new("text/plain", json.into_bytes());

    // WHEN: Decoding it as a handoff record
    let result = HandoffDescriptor::try_from(&message);

    // THEN: Rejected on type
    assert!(matches!(
        result,
        Err(DescriptorError::UnsupportedMimeType { .. })
    ));
}

#[test]
fn given_non_utf8_payload_when_decoded_then_parse_error() {
    let message = BroadcastMessage::new(HANDOFF_MIME_TYPE, vec![0xff, 0xfe, 0xfd]);

    let result = HandoffDescriptor::try_from(&message);

    assert!(matches!(result, Err(DescriptorError::Parse { .. })));
}
