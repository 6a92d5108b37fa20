use crate::helpers::{
    BrokenLinkRadio, OrderRecordingRadio, PROVIDER_URL, RecordingHost, RecordingReporter, SharedRadio,
    UnbindableRadio, loopback_broadcast, tcp_radio,
};

use handoff_core::broadcast::{LoopbackBroadcast, NoBroadcast};
use handoff_core::descriptor::HandoffDescriptor;
use handoff_core::pairing::ListenerState;
use handoff_core::radio::NoRadio;
use handoff_core::renderer::{HandoffBroadcaster, HandoffErrorCode, HandoffResponder, Renderer};

use std::collections::HashSet;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

struct Fixture {
    host: Arc<RecordingHost>,
    reporter: Arc<RecordingReporter>,
    broadcast: Arc<LoopbackBroadcast>,
    broadcaster: HandoffBroadcaster,
}

fn fixture(radios: Arc<dyn handoff_core::radio::AdapterProvider>) -> Fixture {
    let host = Arc::new(RecordingHost::default());
    let reporter = Arc::new(RecordingReporter::default());
    let broadcast = Arc::new(LoopbackBroadcast::new());
    let broadcaster = HandoffBroadcaster::new(host.clone(), loopback_broadcast(&broadcast), radios)
        .with_error_reporter(reporter.clone());

    Fixture {
        host,
        reporter,
        broadcast,
        broadcaster,
    }
}

/// **VALUE**: Verifies that every activation advertises a brand new session.
///
/// **WHY THIS MATTERS**: The session identifier is the rendezvous discriminator. Reusing one
/// lets a peer that saw an old broadcast complete a pairing the user never started.
///
/// **BUG THIS CATCHES**: Would catch a session cached across activations or kept after
/// `close()`.
#[tokio::test]
async fn given_repeated_activations_when_rendered_then_sessions_pairwise_distinct() {
    // GIVEN: A broadcaster with working broadcast and radio
    let mut fixture = fixture(tcp_radio());
    let mut sessions = HashSet::new();

    // WHEN: Activating several times
    for _ in 0..5 {
        fixture.broadcaster.on_render_completed().await;
        let session = fixture.broadcaster.session().expect("session advertised");
        let descriptor = fixture.broadcaster.descriptor().expect("descriptor advertised");

        // THEN: Descriptor and listener always belong to the current session
        assert_eq!(descriptor.session(), session);
        assert!(descriptor.address().is_some());
        assert_eq!(
            fixture.broadcaster.listener_state(),
            Some(ListenerState::Listening)
        );
        assert!(sessions.insert(session), "session {session} was reused");
    }

    fixture.broadcaster.close();

    // THEN: Nothing survives close
    assert_eq!(fixture.broadcaster.session(), None);
    assert!(fixture.broadcaster.descriptor().is_none());
    assert_eq!(fixture.host.closes(), 1);
    assert!(fixture.reporter.codes().is_empty());
}

/// **VALUE**: Verifies the degraded path when there is no broadcast capability at all.
///
/// **WHY THIS MATTERS**: Without broadcast nobody can learn the session, so binding a
/// listener would only hold a radio channel open for nothing.
///
/// **BUG THIS CATCHES**: Would catch activation continuing past a missing broadcast channel,
/// or the error being reported more than once.
#[tokio::test]
async fn given_no_broadcast_capability_when_rendered_then_one_error_and_no_listener() {
    // GIVEN: A host without broadcast hardware
    let host = Arc::new(RecordingHost::default());
    let reporter = Arc::new(RecordingReporter::default());
    let mut broadcaster = HandoffBroadcaster::new(host.clone(), Arc::new(NoBroadcast), tcp_radio())
        .with_error_reporter(reporter.clone());

    // WHEN: Activating
    broadcaster.on_render_completed().await;

    // THEN: Exactly one BroadcastUnavailable and no listener
    assert_eq!(reporter.codes(), vec![HandoffErrorCode::BroadcastUnavailable]);
    assert_eq!(broadcaster.listener_state(), None);
    assert_eq!(broadcaster.session(), None);
}

#[tokio::test]
async fn given_disabled_broadcast_when_rendered_then_broadcast_unavailable_reported() {
    let host = Arc::new(RecordingHost::default());
    let reporter = Arc::new(RecordingReporter::default());
    let broadcast = Arc::new(LoopbackBroadcast::disabled());
    let mut broadcaster =
        HandoffBroadcaster::new(host.clone(), loopback_broadcast(&broadcast), tcp_radio())
            .with_error_reporter(reporter.clone());

    broadcaster.on_render_completed().await;

    assert_eq!(reporter.codes(), vec![HandoffErrorCode::BroadcastUnavailable]);
    assert_eq!(broadcaster.listener_state(), None);
    assert!(!broadcast.has_payload_callback());
}

/// **VALUE**: Verifies degraded mode when the host has no radio adapter.
///
/// **WHY THIS MATTERS**: The handoff can still finish through polling, so the payload must
/// be advertised even though nobody can connect back.
///
/// **BUG THIS CATCHES**: Would catch activation aborting on a missing radio, or an address
/// being advertised without a listener behind it.
#[tokio::test]
async fn given_no_radio_adapter_when_rendered_then_listener_unavailable_and_payload_registered() {
    // GIVEN: Working broadcast, no radio
    let mut fixture = fixture(Arc::new(NoRadio));

    // WHEN: Activating and letting a peer tap
    fixture.broadcaster.on_render_completed().await;
    let message = fixture.broadcast.exchange().expect("payload registered");

    // THEN: One ListenerUnavailable; the descriptor has no address
    assert_eq!(
        fixture.reporter.codes(),
        vec![HandoffErrorCode::ListenerUnavailable]
    );
    let descriptor = HandoffDescriptor::try_from(&message).expect("valid record");
    assert_eq!(descriptor.address(), None);
    assert_eq!(descriptor.provider_url().as_str(), PROVIDER_URL);
    assert_eq!(Some(descriptor.session()), fixture.broadcaster.session());
    assert_eq!(fixture.host.render_completions(), 1);
}

#[tokio::test]
async fn given_unbindable_endpoint_when_rendered_then_listener_bind_failed() {
    let mut fixture = fixture(Arc::new(UnbindableRadio));

    fixture.broadcaster.on_render_completed().await;

    assert_eq!(
        fixture.reporter.codes(),
        vec![HandoffErrorCode::ListenerBindFailed]
    );
    assert!(fixture.broadcast.has_payload_callback());
    assert_eq!(fixture.broadcaster.listener_state(), None);
}

#[tokio::test]
async fn given_dropped_radio_link_when_rendered_then_listener_failed_and_nothing_reported() {
    let mut fixture = fixture(Arc::new(BrokenLinkRadio));

    fixture.broadcaster.on_render_completed().await;
    fixture.broadcaster.wait_for_listener().await;

    assert_eq!(
        fixture.broadcaster.listener_outcome(),
        Some(ListenerState::Failed)
    );
    assert_eq!(
        fixture.broadcaster.listener_state(),
        Some(ListenerState::Closed)
    );
    assert_eq!(fixture.host.proceeds(), 0);
    assert!(fixture.reporter.codes().is_empty());
    assert!(fixture.broadcast.has_payload_callback());
}

/// **VALUE**: Verifies that discovery is stopped before the endpoint is bound.
///
/// **WHY THIS MATTERS**: On short-range radios an active scan starves the listening socket,
/// so peers time out trying to connect.
///
/// **BUG THIS CATCHES**: Would catch `cancel_discovery()` being dropped or moved after
/// `listen()`.
#[tokio::test]
async fn given_radio_when_rendered_then_discovery_cancelled_before_listen() {
    // GIVEN: A radio that records call order
    let radio = OrderRecordingRadio::new();
    let mut fixture = fixture(Arc::new(SharedRadio(radio.clone())));

    // WHEN: Activating
    fixture.broadcaster.on_render_completed().await;

    // THEN: cancel_discovery comes first
    assert_eq!(radio.calls(), vec!["cancel_discovery", "listen"]);
}

/// **VALUE**: Verifies that a completed broadcast exchange triggers exactly one poll.
///
/// **BUG THIS CATCHES**: Would catch the completion callback not being registered, or being
/// registered twice so each tap polls twice.
#[tokio::test]
async fn given_active_broadcaster_when_exchange_completes_then_polls_once() {
    // GIVEN: An active broadcaster
    let mut fixture = fixture(tcp_radio());
    fixture.broadcaster.on_render_completed().await;
    assert_eq!(fixture.host.polls(), 0);

    // WHEN: One peer taps
    fixture.broadcast.exchange().expect("payload registered");

    // THEN: One poll
    assert_eq!(fixture.host.polls(), 1);
    assert!(!fixture.broadcaster.start_polling_on_startup());
}

#[tokio::test]
async fn given_active_broadcaster_when_closed_then_callbacks_unregistered() {
    let mut fixture = fixture(tcp_radio());
    fixture.broadcaster.on_render_completed().await;

    fixture.broadcaster.close();
    fixture.broadcaster.wait_for_listener().await;

    assert!(!fixture.broadcast.has_payload_callback());
    assert!(!fixture.broadcast.has_completion_callback());
    assert!(fixture.broadcast.exchange().is_none());
}

/// **VALUE**: Full handoff between two parties over loopback broadcast and TCP radio.
///
/// **WHY THIS MATTERS**: This is the path a user takes: A shows the screen, B taps, reads the
/// record, connects to A's listener, and A moves on.
///
/// **BUG THIS CATCHES**: Would catch any break between advertising, decoding, connecting
/// with the discriminator and the single `proceed()` call, including the connection being
/// left open afterwards.
#[tokio::test]
async fn given_advertised_session_when_responder_connects_then_proceeds_once_and_closes() {
    // GIVEN: A advertising a session
    let mut fixture = fixture(tcp_radio());
    fixture.broadcaster.on_render_completed().await;
    let responder = HandoffResponder::new(tcp_radio());

    // WHEN: B receives the record and connects
    let message = fixture.broadcast.exchange().expect("payload registered");
    let descriptor = responder.receive(&message).expect("valid record");
    let mut stream = responder.connect(&descriptor).await.expect("connects");
    fixture.host.wait_for_proceed().await;
    fixture.broadcaster.wait_for_listener().await;

    // THEN: A proceeded once and closed its side
    assert_eq!(fixture.host.proceeds(), 1);
    assert_eq!(fixture.host.polls(), 1);
    assert_eq!(
        fixture.broadcaster.listener_state(),
        Some(ListenerState::Closed)
    );
    let mut buffer = [0u8; 1];
    let read = stream.read(&mut buffer).await.unwrap_or(0);
    assert_eq!(read, 0, "initiator should have closed the link");

    // WHEN: Closing after proceed
    fixture.broadcaster.close();

    // THEN: No second proceed, no errors
    assert_eq!(fixture.host.proceeds(), 1);
    assert!(fixture.reporter.codes().is_empty());
}
