use crate::helpers::{BrokenLinkRadio, tcp_radio};

use handoff_core::error::ListenerError;
use handoff_core::pairing::{ListenerState, PairingListener, ProceedHook};
use handoff_core::radio::{NoRadio, RadioAdapter, TcpRadioAdapter};
use handoff_core::session::SessionIdentifier;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

fn counting_hook() -> (Arc<AtomicUsize>, ProceedHook) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = Arc::clone(&count);
    let hook: ProceedHook = Arc::new(move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    });
    (count, hook)
}

/// **VALUE**: Verifies that cancelling an idle listener ends it silently.
///
/// **WHY THIS MATTERS**: Cancellation closes the endpoint under a blocked accept, which
/// surfaces as an I/O error. That error is expected and must not look like a failure.
///
/// **BUG THIS CATCHES**: Would catch a cancelled listener recording `Failed`, or calling
/// `proceed()` on the way out.
#[tokio::test]
async fn given_listening_endpoint_when_cancelled_before_connect_then_no_proceed_and_no_failure() {
    // GIVEN: A started listener
    let (count, hook) = counting_hook();
    let mut listener = PairingListener::new("HandoffRenderer");
    listener
        .start(tcp_radio().as_ref(), SessionIdentifier::generate(), hook)
        .await
        .expect("listener starts");
    assert_eq!(listener.state(), ListenerState::Listening);

    // WHEN: Cancelling before anyone connects
    listener.cancel();
    listener.join().await;

    // THEN: Cancelled, closed, no proceed
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(listener.outcome(), Some(ListenerState::Cancelled));
    assert_eq!(listener.state(), ListenerState::Closed);
}

/// **VALUE**: Verifies that a peer with the wrong session cannot complete the rendezvous.
///
/// **WHY THIS MATTERS**: The listening endpoint is reachable by anyone nearby. Only a peer
/// that saw the broadcast knows the session, and only that peer may trigger `proceed()`.
///
/// **BUG THIS CATCHES**: Would catch the endpoint accepting the first connection regardless
/// of discriminator, or giving up after one bad peer.
#[tokio::test]
async fn given_wrong_discriminator_when_peer_connects_then_rejected_and_right_peer_accepted() {
    // GIVEN: A listener for one session
    let (count, hook) = counting_hook();
    let session = SessionIdentifier::generate();
    let mut listener = PairingListener::new("HandoffRenderer");
    let endpoint = listener
        .start(tcp_radio().as_ref(), session, hook)
        .await
        .expect("listener starts");
    let radio = TcpRadioAdapter::loopback();

    // WHEN: A peer connects with another session
    let mut intruder = radio
        .connect(endpoint.address(), SessionIdentifier::generate())
        .await
        .expect("tcp connect");
    let mut buffer = [0u8; 1];
    let read = intruder.read(&mut buffer).await.unwrap_or(0);

    // THEN: It is dropped and the listener keeps waiting
    assert_eq!(read, 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(listener.state(), ListenerState::Listening);

    // WHEN: The right peer connects
    let _peer = radio
        .connect(endpoint.address(), session)
        .await
        .expect("tcp connect");
    listener.join().await;

    // THEN: Exactly one proceed
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(listener.outcome(), Some(ListenerState::Accepted));
}

#[tokio::test]
async fn given_accepted_listener_when_cancelled_then_noop() {
    let (count, hook) = counting_hook();
    let session = SessionIdentifier::generate();
    let mut listener = PairingListener::new("HandoffRenderer");
    let endpoint = listener
        .start(tcp_radio().as_ref(), session, hook)
        .await
        .expect("listener starts");

    let _peer = TcpRadioAdapter::loopback()
        .connect(endpoint.address(), session)
        .await
        .expect("tcp connect");
    listener.join().await;

    listener.cancel();
    listener.cancel();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(listener.outcome(), Some(ListenerState::Accepted));
}

#[tokio::test]
async fn given_no_radio_when_started_then_adapter_unavailable_and_closed() {
    let (_, hook) = counting_hook();
    let mut listener = PairingListener::new("HandoffRenderer");

    let result = listener
        .start(&NoRadio, SessionIdentifier::generate(), hook)
        .await;

    assert!(matches!(result, Err(ListenerError::AdapterUnavailable { .. })));
    assert_eq!(listener.state(), ListenerState::Closed);
    assert_eq!(listener.outcome(), Some(ListenerState::Failed));
}

/// **VALUE**: Verifies that a listener is single-use.
///
/// **BUG THIS CATCHES**: Would catch a second `start()` binding another endpoint and
/// orphaning the first worker.
#[tokio::test]
async fn given_started_listener_when_started_again_then_invalid_state() {
    // GIVEN: A running listener
    let (_, hook) = counting_hook();
    let mut listener = PairingListener::new("HandoffRenderer");
    listener
        .start(tcp_radio().as_ref(), SessionIdentifier::generate(), hook.clone())
        .await
        .expect("listener starts");

    // WHEN: Starting it again
    let result = listener
        .start(tcp_radio().as_ref(), SessionIdentifier::generate(), hook)
        .await;

    // THEN: Refused
    assert!(matches!(result, Err(ListenerError::InvalidState { .. })));
    assert_eq!(listener.state(), ListenerState::Listening);
}

#[tokio::test]
async fn given_cancelled_fresh_listener_when_started_then_invalid_state() {
    let (_, hook) = counting_hook();
    let mut listener = PairingListener::new("HandoffRenderer");
    listener.cancel();

    let result = listener
        .start(tcp_radio().as_ref(), SessionIdentifier::generate(), hook)
        .await;

    assert!(matches!(result, Err(ListenerError::InvalidState { .. })));
    assert_eq!(listener.outcome(), None);
}

/// **VALUE**: Verifies that an accept failing for reasons other than cancellation is
/// recorded as `Failed` and never proceeds.
///
/// **WHY THIS MATTERS**: Radio links drop. A dropped link must end the listener cleanly
/// without moving the host on to a peer that never arrived.
///
/// **BUG THIS CATCHES**: Would catch the worker treating any accept error as cancellation,
/// leaving the state at `Listening`, or calling `proceed()` on the error path.
#[tokio::test]
async fn given_listening_endpoint_when_accept_fails_then_failed_without_proceed() {
    // GIVEN: A listener whose endpoint drops the link on accept
    let (count, hook) = counting_hook();
    let mut listener = PairingListener::new("HandoffRenderer");
    listener
        .start(&BrokenLinkRadio, SessionIdentifier::generate(), hook)
        .await
        .expect("listener starts");

    // WHEN: The worker finishes
    listener.join().await;

    // THEN: Failed, closed, no proceed
    assert_eq!(listener.outcome(), Some(ListenerState::Failed));
    assert_eq!(listener.state(), ListenerState::Closed);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// **VALUE**: Verifies that a peer that connects and never sends its discriminator does
/// not delay the real peer.
///
/// **WHY THIS MATTERS**: Anyone in range can open a connection. If discriminator reads ran
/// one at a time, a silent connection would stall pairing for the whole timeout, and
/// repeating it would block pairing indefinitely.
///
/// **BUG THIS CATCHES**: Would catch the endpoint reading preambles sequentially inside
/// the accept loop.
#[tokio::test]
async fn given_silent_peer_connected_first_when_right_peer_connects_then_accepted_without_waiting() {
    // GIVEN: A listener with a long discriminator timeout and a silent peer already connected
    let (count, hook) = counting_hook();
    let session = SessionIdentifier::generate();
    let radio = Arc::new(TcpRadioAdapter::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        Duration::from_secs(30),
    ));
    let mut listener = PairingListener::new("HandoffRenderer");
    let endpoint = listener
        .start(&radio, session, hook)
        .await
        .expect("listener starts");
    let _silent = TcpStream::connect(endpoint.address())
        .await
        .expect("tcp connect");

    // WHEN: The right peer connects
    let _peer = radio
        .connect(endpoint.address(), session)
        .await
        .expect("tcp connect");

    // THEN: Accepted well before the silent peer times out
    tokio::time::timeout(Duration::from_secs(3), listener.join())
        .await
        .expect("right peer was held up by the silent one");
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(listener.outcome(), Some(ListenerState::Accepted));
}
