use crate::error::credential::CredentialError;
use crate::store::{DataSource, scoped_key};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::sync::Arc;

use log::debug;
use url::Url;

const MASTER_CLIENT_ID: &str = "PREF_MASTER_CLIENT_ID";
const CLIENT_ID: &str = "PREF_CLIENT_ID";
const CLIENT_SECRET: &str = "PREF_CLIENT_SECRET";
const CLIENT_EXPIRE_TIME: &str = "PREF_CLIENT_EXPIRE_TIME";

const KEYS: [&str; 4] = [MASTER_CLIENT_ID, CLIENT_ID, CLIENT_SECRET, CLIENT_EXPIRE_TIME];

/// Expiration reported when none was stored.
pub const NO_EXPIRATION: i64 = -1;

/// OAuth client registration issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub master_client_id: String,
    pub client_id: String,
    pub client_secret: RedactedSecret,
    /// Seconds since the Unix epoch, `0` for never.
    pub client_expiration: i64,
}

pub struct ClientCredentialStorage {
    storage: Arc<dyn DataSource>,
    gateway: Option<Url>,
}

impl ClientCredentialStorage {
    pub fn new(storage: Arc<dyn DataSource>, gateway: Option<Url>) -> Self {
        Self { storage, gateway }
    }

    fn key(&self, name: &str) -> Result<String, CredentialError> {
        scoped_key(self.gateway.as_ref(), name)
    }

    fn read(&self, name: &str) -> Result<Option<String>, CredentialError> {
        self.storage.get(&self.key(name)?)
    }

    pub fn save_client_credentials(&self, credentials: &ClientCredentials) -> Result<(), CredentialError> {
        self.storage
            .put(&self.key(MASTER_CLIENT_ID)?, &credentials.master_client_id)?;
        self.storage.put(&self.key(CLIENT_ID)?, &credentials.client_id)?;
        self.storage
            .put(&self.key(CLIENT_SECRET)?, credentials.client_secret.expose())?;
        self.storage.put(
            &self.key(CLIENT_EXPIRE_TIME)?,
            &credentials.client_expiration.to_string(),
        )?;
        Ok(())
    }

    pub fn master_client_id(&self) -> Result<Option<String>, CredentialError> {
        self.read(MASTER_CLIENT_ID)
    }

    pub fn client_id(&self) -> Result<Option<String>, CredentialError> {
        self.read(CLIENT_ID)
    }

    pub fn client_secret(&self) -> Result<Option<RedactedSecret>, CredentialError> {
        Ok(self.read(CLIENT_SECRET)?.map(RedactedSecret::from))
    }

    /// Stored expiration, or [`NO_EXPIRATION`] when absent.
    pub fn client_expiration(&self) -> Result<i64, CredentialError> {
        match self.read(CLIENT_EXPIRE_TIME)? {
            Some(value) => value.parse().map_err(|e| CredentialError::Decode {
                message: format!("Invalid client expiration {value:?}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(NO_EXPIRATION),
        }
    }

    /// Remove this store's keys for the connected gateway.
    pub fn clear(&self) -> Result<(), CredentialError> {
        debug!("Clearing client credentials");
        for name in KEYS {
            self.storage.remove(&self.key(name)?)?;
        }
        Ok(())
    }

    /// Wipe the whole data source.
    pub fn clear_all(&self) -> Result<(), CredentialError> {
        debug!("Clearing all stored credentials");
        self.storage.remove_all()
    }
}
