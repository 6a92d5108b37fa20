//! Short-range broadcast capability.
//!
//! The broadcast channel is a one-way, proximity-based advertisement path
//! (NFC push, beacon, QR relay...). It only carries the small handoff
//! descriptor. The handoff broadcaster talks to it through two registrations:
//!
//! - a **payload callback**, asked for the record to push when a peer is in range
//! - a **completion callback**, invoked once after each finished exchange
//!
//! Keeping both as plain callbacks decouples the broadcast technology from the
//! poll-triggering logic that reacts to it.

pub mod loopback;

pub use loopback::LoopbackBroadcast;

use std::sync::Arc;

/// Builds the record pushed to a peer during an exchange.
pub type PayloadCallback = Arc<dyn Fn() -> BroadcastMessage + Send + Sync>;

/// Invoked once per completed exchange.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// A single MIME record pushed over the broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    mime_type: String,
    payload: Vec<u8>,
}

impl BroadcastMessage {
    pub fn new(mime_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Platform broadcast capability.
///
/// Callbacks may be invoked from a thread owned by the implementation.
/// Registering `None` unregisters the current callback.
pub trait BroadcastChannel: Send + Sync {
    /// Whether the capability is switched on.
    fn is_enabled(&self) -> bool;

    fn set_payload_callback(&self, callback: Option<PayloadCallback>);

    fn set_completion_callback(&self, callback: Option<CompletionCallback>);
}

/// Resolves the broadcast capability of the host, if it has one.
pub trait BroadcastProvider: Send + Sync {
    fn default_channel(&self) -> Option<Arc<dyn BroadcastChannel>>;
}

/// Provider for hosts without any broadcast hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBroadcast;

impl BroadcastProvider for NoBroadcast {
    fn default_channel(&self) -> Option<Arc<dyn BroadcastChannel>> {
        None
    }
}
