//! In-process broadcast channel.
//!
//! Stands in for a near-field radio on hosts that don't have one and in
//! tests: [`LoopbackBroadcast::exchange`] simulates one peer tapping the
//! device and hands back the record that would have been pushed.

use crate::broadcast::{
    BroadcastChannel, BroadcastMessage, BroadcastProvider, CompletionCallback, PayloadCallback,
};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

pub struct LoopbackBroadcast {
    enabled: AtomicBool,
    payload_callback: Mutex<Option<PayloadCallback>>,
    completion_callback: Mutex<Option<CompletionCallback>>,
    exchanges: AtomicUsize,
}

impl LoopbackBroadcast {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            payload_callback: Mutex::new(None),
            completion_callback: Mutex::new(None),
            exchanges: AtomicUsize::new(0),
        }
    }

    /// A channel that exists but is switched off.
    pub fn disabled() -> Self {
        let channel = Self::new();
        channel.set_enabled(false);
        channel
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn has_payload_callback(&self) -> bool {
        self.payload_callback
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn has_completion_callback(&self) -> bool {
        self.completion_callback
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Number of exchanges that delivered a record.
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// Simulate one exchange with a peer in range.
    ///
    /// Returns the pushed record, or `None` when the channel is disabled or no
    /// payload is registered. The completion callback fires once, after the
    /// record has been produced.
    pub fn exchange(&self) -> Option<BroadcastMessage> {
        if !self.is_enabled() {
            debug!("Loopback broadcast disabled, exchange skipped");
            return None;
        }

        // Clone the callbacks out so they run without holding the lock
        let payload_callback = self.payload_callback.lock().ok()?.as_ref().map(Arc::clone)?;
        let message = payload_callback();

        self.exchanges.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Loopback broadcast pushed {} bytes of {}",
            message.payload().len(),
            message.mime_type()
        );

        let completion_callback = self
            .completion_callback
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(Arc::clone));
        if let Some(callback) = completion_callback {
            callback();
        }

        Some(message)
    }
}

impl Default for LoopbackBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastChannel for LoopbackBroadcast {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_payload_callback(&self, callback: Option<PayloadCallback>) {
        if let Ok(mut guard) = self.payload_callback.lock() {
            *guard = callback;
        }
    }

    fn set_completion_callback(&self, callback: Option<CompletionCallback>) {
        if let Ok(mut guard) = self.completion_callback.lock() {
            *guard = callback;
        }
    }
}

impl BroadcastProvider for Arc<LoopbackBroadcast> {
    fn default_channel(&self) -> Option<Arc<dyn BroadcastChannel>> {
        Some(Arc::clone(self) as Arc<dyn BroadcastChannel>)
    }
}
