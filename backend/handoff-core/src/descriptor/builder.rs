use crate::descriptor::HandoffDescriptor;
use crate::error::descriptor::DescriptorError;
use crate::session::SessionIdentifier;

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

/// Builder for creating validated [`HandoffDescriptor`] instances.
#[derive(Debug, Default)]
pub struct HandoffDescriptorBuilder {
    session: Option<SessionIdentifier>,
    provider_url: Option<String>,
    address: Option<String>,
}

impl HandoffDescriptorBuilder {
    pub fn with_session(mut self, session: SessionIdentifier) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = Some(url.into());
        self
    }

    /// Listener address. Leave unset in degraded mode.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_optional_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    /// Build the descriptor with validation.
    #[track_caller]
    pub fn build(self) -> Result<HandoffDescriptor, DescriptorError> {
        let session = self.session.ok_or_else(|| DescriptorError::Validation {
            message: String::from("Session identifier is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let raw_url = self.provider_url.ok_or_else(|| DescriptorError::Validation {
            message: String::from("Provider URL is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let provider_url = Url::parse(&raw_url)?;

        if !matches!(provider_url.scheme(), "http" | "https") {
            return Err(DescriptorError::Validation {
                message: format!("Provider URL must be http(s), got {}", provider_url.scheme()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(ref address) = self.address {
            if address.trim().is_empty() {
                return Err(DescriptorError::Validation {
                    message: String::from("Listener address cannot be empty"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        Ok(HandoffDescriptor {
            session,
            provider_url,
            address: self.address,
        })
    }
}
