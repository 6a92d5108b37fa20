//! Handoff broadcaster: the initiator side of a device-to-device handoff.
//!
//! On activation the broadcaster:
//!
//! 1. resolves the broadcast capability (missing or disabled is reported and stops activation)
//! 2. generates a fresh [`SessionIdentifier`]
//! 3. starts a [`PairingListener`] for it (failure is reported, activation continues degraded)
//! 4. registers a completion callback that triggers a fallback poll
//! 5. registers the [`HandoffDescriptor`] as the broadcast payload
//! 6. hands back to the host lifecycle
//!
//! It never polls on startup; polls only follow a completed broadcast
//! exchange or a successful pairing.

use crate::broadcast::{
    BroadcastChannel, BroadcastMessage, BroadcastProvider, CompletionCallback, PayloadCallback,
};
use crate::config::HandoffConfig;
use crate::descriptor::{HandoffDescriptor, HandoffDescriptorBuilder};
use crate::error::descriptor::DescriptorError;
use crate::error::listener::ListenerError;
use crate::pairing::{ListenerState, PairingListener, ProceedHook};
use crate::radio::AdapterProvider;
use crate::renderer::{ErrorReporter, HandoffErrorCode, IgnoreErrors, RenderHost, Renderer};
use crate::session::SessionIdentifier;
use crate::{DEFAULT_SERVICE_NAME, HANDOFF_MIME_TYPE};

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

pub struct HandoffBroadcaster {
    host: Arc<dyn RenderHost>,
    broadcasts: Arc<dyn BroadcastProvider>,
    radios: Arc<dyn AdapterProvider>,
    reporter: Arc<dyn ErrorReporter>,
    service_name: String,
    mime_type: String,
    channel: Option<Arc<dyn BroadcastChannel>>,
    listener: Option<PairingListener>,
    session: Option<SessionIdentifier>,
    descriptor: Option<HandoffDescriptor>,
}

impl HandoffBroadcaster {
    pub fn new(
        host: Arc<dyn RenderHost>,
        broadcasts: Arc<dyn BroadcastProvider>,
        radios: Arc<dyn AdapterProvider>,
    ) -> Self {
        Self {
            host,
            broadcasts,
            radios,
            reporter: Arc::new(IgnoreErrors),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            mime_type: HANDOFF_MIME_TYPE.to_string(),
            channel: None,
            listener: None,
            session: None,
            descriptor: None,
        }
    }

    /// Route degradable failures to `reporter` instead of ignoring them.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Take the service name and payload MIME type from `config`.
    pub fn with_config(mut self, config: &HandoffConfig) -> Self {
        self.service_name = config.listener.service_name.clone();
        self.mime_type = config.broadcast.mime_type.clone();
        self
    }

    /// Session of the current advertisement attempt.
    pub fn session(&self) -> Option<SessionIdentifier> {
        self.session
    }

    /// Descriptor currently registered as the broadcast payload.
    pub fn descriptor(&self) -> Option<&HandoffDescriptor> {
        self.descriptor.as_ref()
    }

    /// State of the current pairing listener, `None` when none was started.
    pub fn listener_state(&self) -> Option<ListenerState> {
        self.listener.as_ref().map(PairingListener::state)
    }

    /// How the current pairing listener ended, `None` while it runs or when none was started.
    pub fn listener_outcome(&self) -> Option<ListenerState> {
        self.listener.as_ref().and_then(PairingListener::outcome)
    }

    /// Wait until the current pairing listener's worker has exited.
    pub async fn wait_for_listener(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.join().await;
        }
    }

    fn report(&self, code: HandoffErrorCode, message: &str, cause: Option<&ListenerError>) {
        warn!("Handoff error {code}: {message}");
        self.reporter.on_error(
            code,
            message,
            cause.map(|e| e as &(dyn std::error::Error + 'static)),
        );
    }

    /// Drop everything belonging to the previous advertisement attempt.
    fn end_attempt(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.cancel();
        }

        if let Some(channel) = self.channel.take() {
            channel.set_payload_callback(None);
            channel.set_completion_callback(None);
        }

        self.session = None;
        self.descriptor = None;
    }

    async fn start_listener(&mut self, session: SessionIdentifier) -> Option<String> {
        let host = Arc::clone(&self.host);
        let proceed: ProceedHook = Arc::new(move || host.proceed());

        let mut listener = PairingListener::new(self.service_name.clone());
        match listener.start(self.radios.as_ref(), session, proceed).await {
            Ok(endpoint) => {
                let address = endpoint.address().to_string();
                self.listener = Some(listener);
                Some(address)
            }
            Err(e) => {
                let (code, message) = match e {
                    ListenerError::AdapterUnavailable { .. } => (
                        HandoffErrorCode::ListenerUnavailable,
                        "Unable to start pairing listener",
                    ),
                    _ => (
                        HandoffErrorCode::ListenerBindFailed,
                        "Unable to bind pairing endpoint",
                    ),
                };
                info!("Pairing listener unavailable, relying on polling: {e}");
                self.report(code, message, Some(&e));
                None
            }
        }
    }

    fn build_payload(
        &self,
        session: SessionIdentifier,
        address: Option<String>,
    ) -> Result<(HandoffDescriptor, BroadcastMessage), DescriptorError> {
        let descriptor = HandoffDescriptorBuilder::default()
            .with_session(session)
            .with_provider_url(self.host.provider_url().to_string())
            .with_optional_address(address)
            .build()?;
        let message = descriptor.to_message(&self.mime_type)?;
        Ok((descriptor, message))
    }
}

#[async_trait]
impl Renderer for HandoffBroadcaster {
    async fn on_render_completed(&mut self) {
        self.end_attempt();

        let channel = match self.broadcasts.default_channel() {
            None => {
                self.report(
                    HandoffErrorCode::BroadcastUnavailable,
                    "Broadcast is not available",
                    None,
                );
                return;
            }
            Some(channel) if !channel.is_enabled() => {
                self.report(
                    HandoffErrorCode::BroadcastUnavailable,
                    "Broadcast is not enabled",
                    None,
                );
                return;
            }
            Some(channel) => channel,
        };

        let session = SessionIdentifier::generate();
        self.session = Some(session);

        let address = self.start_listener(session).await;

        let host = Arc::clone(&self.host);
        let on_complete: CompletionCallback = Arc::new(move || host.poll());
        channel.set_completion_callback(Some(on_complete));

        match self.build_payload(session, address) {
            Ok((descriptor, message)) => {
                let payload: PayloadCallback = Arc::new(move || message.clone());
                channel.set_payload_callback(Some(payload));
                debug!("Registered handoff payload for session {session}");
                self.descriptor = Some(descriptor);
            }
            Err(e) => {
                // Polling may still complete the handoff
                error!("Failed to set broadcast payload: {e}");
            }
        }

        self.channel = Some(channel);
        self.host.on_render_completed();
    }

    fn close(&mut self) {
        self.end_attempt();
        self.host.close();
    }

    fn start_polling_on_startup(&self) -> bool {
        false
    }
}
