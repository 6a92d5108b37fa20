//! The handoff descriptor advertised over the broadcast channel.
//!
//! The descriptor is the only thing a responder learns from the broadcast:
//! which session to ask for, which provider backs it, and where the
//! initiator's pairing listener can be reached.
//!
//! # Wire format
//!
//! A JSON object carried in a MIME record of type [`HANDOFF_MIME_TYPE`]:
//!
//! ```json
//! {"uuid":"6f1c...","provider_url":"https://svc.example/","address":"AA:BB:CC:DD:EE:FF"}
//! ```
//!
//! `address` is omitted when the initiator runs without a live listener.
//!
//! `provider_url` is carried in WHATWG-normalised form: `https://svc.example`
//! goes out as `https://svc.example/`, and a record received with the short
//! form re-encodes with the trailing slash. Compare provider URLs parsed, not
//! as raw strings.

mod builder;

pub use builder::HandoffDescriptorBuilder;

use crate::HANDOFF_MIME_TYPE;
use crate::broadcast::BroadcastMessage;
use crate::error::descriptor::DescriptorError;
use crate::session::SessionIdentifier;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use url::Url;

pub const UUID_FIELD: &str = "uuid";
pub const PROVIDER_URL_FIELD: &str = "provider_url";
pub const ADDRESS_FIELD: &str = "address";

/// Compact session descriptor published as the broadcast payload.
///
/// Read-only once built; construct through [`HandoffDescriptorBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffDescriptor {
    #[serde(rename = "uuid")]
    session: SessionIdentifier,
    provider_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

impl HandoffDescriptor {
    pub fn session(&self) -> SessionIdentifier {
        self.session
    }

    pub fn provider_url(&self) -> &Url {
        &self.provider_url
    }

    /// Listener address, `None` when the initiator is in degraded mode.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Serialize to the compact JSON payload.
    #[track_caller]
    pub fn to_json(&self) -> Result<String, DescriptorError> {
        serde_json::to_string(self).map_err(|e| DescriptorError::Serialize {
            message: format!("Failed to serialize handoff descriptor: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        serde_json::from_str(json).map_err(|e| DescriptorError::Parse {
            message: format!("Failed to parse handoff descriptor: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Wrap the JSON payload in a broadcast record of the given MIME type.
    #[track_caller]
    pub fn to_message(&self, mime_type: &str) -> Result<BroadcastMessage, DescriptorError> {
        let json = self.to_json()?;
        Ok(BroadcastMessage::new(mime_type, json.into_bytes()))
    }

    /// Decode a received broadcast record.
    ///
    /// # Errors
    ///
    /// - [`DescriptorError::UnsupportedMimeType`] if the record is not a handoff record
    /// - [`DescriptorError::Parse`] if the body is not UTF-8 JSON of the expected shape
    #[track_caller]
    pub fn from_message(
        message: &BroadcastMessage,
        expected_mime_type: &str,
    ) -> Result<Self, DescriptorError> {
        if message.mime_type() != expected_mime_type {
            return Err(DescriptorError::UnsupportedMimeType {
                message: format!(
                    "Expected {expected_mime_type}, received {}",
                    message.mime_type()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let json = std::str::from_utf8(message.payload()).map_err(|e| DescriptorError::Parse {
            message: format!("Payload is not UTF-8: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Self::from_json(json)
    }
}

impl TryFrom<&BroadcastMessage> for HandoffDescriptor {
    type Error = DescriptorError;

    #[track_caller]
    fn try_from(message: &BroadcastMessage) -> Result<Self, Self::Error> {
        Self::from_message(message, HANDOFF_MIME_TYPE)
    }
}
