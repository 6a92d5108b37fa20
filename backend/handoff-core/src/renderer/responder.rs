//! Responder side of a handoff: read the broadcast, dial the initiator.

use crate::HANDOFF_MIME_TYPE;
use crate::broadcast::BroadcastMessage;
use crate::descriptor::HandoffDescriptor;
use crate::error::descriptor::DescriptorError;
use crate::error::listener::ListenerError;
use crate::radio::{AdapterProvider, RadioStream};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::info;

pub struct HandoffResponder {
    radios: Arc<dyn AdapterProvider>,
    mime_type: String,
}

impl HandoffResponder {
    pub fn new(radios: Arc<dyn AdapterProvider>) -> Self {
        Self {
            radios,
            mime_type: HANDOFF_MIME_TYPE.to_string(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Decode a record received over the broadcast channel.
    pub fn receive(&self, message: &BroadcastMessage) -> Result<HandoffDescriptor, DescriptorError> {
        let descriptor = HandoffDescriptor::from_message(message, &self.mime_type)?;
        info!(
            "Received handoff for session {} from {}",
            descriptor.session(),
            descriptor.provider_url()
        );
        Ok(descriptor)
    }

    /// Open the rendezvous link advertised by `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::NoAddress`] if the initiator advertised without a live listener
    /// - [`ListenerError::AdapterUnavailable`] if this host has no radio adapter
    /// - [`ListenerError::Connect`] if the endpoint could not be reached
    pub async fn connect(&self, descriptor: &HandoffDescriptor) -> Result<RadioStream, ListenerError> {
        let address = descriptor.address().ok_or_else(|| ListenerError::NoAddress {
            message: format!(
                "Session {} was advertised without a pairing listener",
                descriptor.session()
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let adapter = self
            .radios
            .default_adapter()
            .ok_or_else(|| ListenerError::AdapterUnavailable {
                message: String::from("Unable to acquire radio adapter"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        adapter.cancel_discovery();

        let stream = adapter
            .connect(address, descriptor.session())
            .await
            .map_err(|e| ListenerError::Connect {
                message: format!("Failed to reach pairing listener at {address}"),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        info!("Connected to pairing listener at {address}");
        Ok(stream)
    }
}
