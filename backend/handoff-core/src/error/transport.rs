use crate::error::credential::CredentialError;

use common::ErrorLocation;

use std::error::Error as StdError;
use std::io::Error as IoError;

use thiserror::Error as ThisError;

/// Errors raised while building or using a secure socket factory.
///
/// `Construction` is the single fatal error for anything that goes wrong while
/// assembling the TLS context. It is never recovered into a weaker factory.
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Transport Construction Failed: {message} {location}")]
    Construction {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Credential Error: {message} {location}")]
    Credentials {
        message: String,
        location: ErrorLocation,
        #[source]
        source: CredentialError,
    },

    #[error("Server Name Error: {message} {location}")]
    ServerName {
        message: String,
        location: ErrorLocation,
    },

    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },
}

impl TransportError {
    /// Wrap `source` as the fatal construction error, located at the caller.
    #[track_caller]
    pub fn construction(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        TransportError::Construction {
            message: message.into(),
            location: ErrorLocation::from(std::panic::Location::caller()),
            source: source.into(),
        }
    }
}
