//! Pairing listener: the initiator's single-use rendezvous.
//!
//! The listener binds one endpoint keyed by the session identifier, waits on a
//! background task for exactly one inbound connection and then tells its owner
//! to proceed. Cancellation closes the endpoint; the pending accept fails and
//! the failure is swallowed as a normal lifecycle event.
//!
//! # State machine
//!
//! ```text
//! Created ──start──▶ Listening ──accept──▶ Accepted ──┐
//!    │                  │ ├──cancel──▶ Cancelled ──────┼──▶ Closed
//!    │                  │ └──io error─▶ Failed ────────┘
//!    └──cancel──────────┴──────────────────────────────────▶ Closed
//! ```
//!
//! There is no way back from a terminal state; every advertisement attempt
//! gets a fresh listener.

mod listener;
pub(crate) mod state;

pub use listener::{ListenerEndpoint, PairingListener, ProceedHook};
pub use state::ListenerState;
