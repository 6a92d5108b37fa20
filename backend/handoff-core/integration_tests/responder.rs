use crate::helpers::tcp_radio;

use handoff_core::broadcast::BroadcastMessage;
use handoff_core::descriptor::HandoffDescriptorBuilder;
use handoff_core::error::{DescriptorError, ListenerError};
use handoff_core::radio::NoRadio;
use handoff_core::renderer::HandoffResponder;
use handoff_core::session::SessionIdentifier;

use std::sync::Arc;

/// **VALUE**: Verifies that a degraded advertisement is not dialled.
///
/// **WHY THIS MATTERS**: Without an address there is no listener to reach; the responder
/// must fall back to polling instead of failing on a bogus connect.
///
/// **BUG THIS CATCHES**: Would catch `connect()` trying the adapter with an empty address.
#[tokio::test]
async fn given_descriptor_without_address_when_connecting_then_no_address_error() {
    // GIVEN: A descriptor from an initiator with no listener
    let descriptor = HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("https://svc.example")
        .build()
        .expect("valid descriptor");
    let responder = HandoffResponder::new(tcp_radio());

    // WHEN: Connecting
    let result = responder.connect(&descriptor).await;

    // THEN: NoAddress
    assert!(matches!(result, Err(ListenerError::NoAddress { .. })));
}

#[tokio::test]
async fn given_no_radio_when_connecting_then_adapter_unavailable() {
    let descriptor = HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("https://svc.example")
        .with_address("127.0.0.1:9")
        .build()
        .expect("valid descriptor");
    let responder = HandoffResponder::new(Arc::new(NoRadio));

    let result = responder.connect(&descriptor).await;

    assert!(matches!(
        result,
        Err(ListenerError::AdapterUnavailable { .. })
    ));
}

#[test]
fn given_custom_mime_type_when_receiving_default_record_then_rejected() {
    let descriptor = HandoffDescriptorBuilder::default()
        .with_session(SessionIdentifier::generate())
        .with_provider_url("https://svc.example")
        .build()
        .expect("valid descriptor");
    let message = descriptor
        .to_message(handoff_core::HANDOFF_MIME_TYPE)
        .expect("serializes");
    let responder = HandoffResponder::new(Arc::new(NoRadio)).with_mime_type("application/x-other");

    let result = responder.receive(&message);

    assert!(matches!(
        result,
        Err(DescriptorError::UnsupportedMimeType { .. })
    ));
}

#[test]
fn given_malformed_json_record_when_receiving_then_parse_error() {
    let message = BroadcastMessage::new(handoff_core::HANDOFF_MIME_TYPE, b"{\"uuid\":".to_vec());
    let responder = HandoffResponder::new(Arc::new(NoRadio));

    let result = responder.receive(&message);

    assert!(matches!(result, Err(DescriptorError::Parse { .. })));
}
