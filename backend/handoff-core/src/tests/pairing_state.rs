// Unit tests for the listener state machine behind PairingListener
// Listener behaviour over a real radio is covered in integration_tests/pairing.rs

use crate::pairing::ListenerState;
use crate::pairing::state::SharedState;

/// **VALUE**: Verifies that a transition only happens from the expected source state.
///
/// **WHY THIS MATTERS**: The accept worker and `cancel()` race on the same state. The
/// compare-and-set is the only thing deciding which of them wins.
///
/// **BUG THIS CATCHES**: Would catch a transition that ignores `from`, letting a late
/// accept overwrite a cancellation and call `proceed()` after the user backed out.
#[test]
fn given_cancelled_listener_when_accept_transition_attempted_then_rejected() {
    // GIVEN: A listener that was listening and then cancelled
    let state = SharedState::new();
    assert!(state.transition(ListenerState::Created, ListenerState::Listening));
    assert!(state.transition(ListenerState::Listening, ListenerState::Cancelled));

    // WHEN: The accept worker tries to claim the connection
    let accepted = state.transition(ListenerState::Listening, ListenerState::Accepted);

    // THEN: The accept loses and the state stays cancelled
    assert!(!accepted);
    assert_eq!(state.get(), ListenerState::Cancelled);
    assert_eq!(state.outcome(), Some(ListenerState::Cancelled));
}

/// **VALUE**: Verifies that closing keeps the outcome of the listening phase.
///
/// **WHY THIS MATTERS**: Callers look at `outcome()` after the worker exits to find out
/// whether a peer actually arrived; `Closed` alone does not say.
///
/// **BUG THIS CATCHES**: Would catch `close()` clearing the recorded outcome.
#[test]
fn given_accepted_listener_when_closed_then_outcome_survives() {
    // GIVEN: An accepted listener
    let state = SharedState::new();
    state.transition(ListenerState::Created, ListenerState::Listening);
    state.transition(ListenerState::Listening, ListenerState::Accepted);

    // WHEN: Closing it
    let previous = state.close();

    // THEN: Previous state is reported and the outcome is kept
    assert_eq!(previous, ListenerState::Accepted);
    assert_eq!(state.get(), ListenerState::Closed);
    assert_eq!(state.outcome(), Some(ListenerState::Accepted));
}

/// **VALUE**: Verifies that a listener closed before it ever listened records no outcome.
///
/// **BUG THIS CATCHES**: Would catch `Closed` being recorded as an outcome, which would make
/// an unused listener look like it finished a rendezvous.
#[test]
fn given_fresh_listener_when_closed_then_no_outcome() {
    // GIVEN: A fresh state
    let state = SharedState::new();

    // WHEN: Moving straight to closed
    let moved = state.transition(ListenerState::Created, ListenerState::Closed);

    // THEN: No outcome is recorded
    assert!(moved);
    assert!(state.get().is_finished());
    assert_eq!(state.outcome(), None);
}

#[test]
fn given_listener_states_when_checked_then_only_created_and_listening_are_live() {
    let live = [ListenerState::Created, ListenerState::Listening];
    let finished = [
        ListenerState::Accepted,
        ListenerState::Cancelled,
        ListenerState::Failed,
        ListenerState::Closed,
    ];

    for state in live {
        assert!(!state.is_finished(), "{state} should be live");
    }
    for state in finished {
        assert!(state.is_finished(), "{state} should be finished");
    }
}
