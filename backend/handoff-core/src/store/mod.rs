//! Gateway-scoped credential storage.
//!
//! Values live in a [`DataSource`] under keys prefixed with the connected
//! gateway URL, so enrolments against different gateways never collide. A
//! store created without a gateway reports [`CredentialError::NotInitialized`]
//! on every access.

pub mod client_credentials;
pub mod client_identity;
pub mod memory;

pub use client_credentials::{ClientCredentialStorage, ClientCredentials};
pub use client_identity::ClientIdentityStorage;
pub use memory::MemoryDataSource;

use crate::error::credential::CredentialError;

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

/// String key/value persistence behind the credential stores.
pub trait DataSource: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    fn put(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    fn remove(&self, key: &str) -> Result<(), CredentialError>;

    /// Remove every key, whichever store wrote it.
    fn remove_all(&self) -> Result<(), CredentialError>;
}

/// `{gateway}{name}`, or `NotInitialized` when no gateway is connected.
#[track_caller]
pub(crate) fn scoped_key(gateway: Option<&Url>, name: &str) -> Result<String, CredentialError> {
    match gateway {
        Some(gateway) => Ok(format!("{gateway}{name}")),
        None => Err(CredentialError::NotInitialized {
            message: String::from("No gateway connected"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
