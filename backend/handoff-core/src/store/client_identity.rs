use crate::error::credential::CredentialError;
use crate::store::{DataSource, scoped_key};
use crate::transport::identity::{ClientIdentity, CredentialSource};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::sync::Arc;

use log::debug;
use url::Url;

const PRIVATE_KEY: &str = "PREF_PRIVATE_KEY";
const CERTIFICATE_CHAIN: &str = "PREF_CERTIFICATE_CHAIN";

/// Client key and certificate chain, stored as PEM.
pub struct ClientIdentityStorage {
    storage: Arc<dyn DataSource>,
    gateway: Option<Url>,
}

impl ClientIdentityStorage {
    pub fn new(storage: Arc<dyn DataSource>, gateway: Option<Url>) -> Self {
        Self { storage, gateway }
    }

    fn key(&self, name: &str) -> Result<String, CredentialError> {
        scoped_key(self.gateway.as_ref(), name)
    }

    pub fn save_identity(
        &self,
        private_key_pem: &RedactedSecret,
        certificate_chain_pem: &str,
    ) -> Result<(), CredentialError> {
        self.storage
            .put(&self.key(PRIVATE_KEY)?, private_key_pem.expose())?;
        self.storage
            .put(&self.key(CERTIFICATE_CHAIN)?, certificate_chain_pem)?;
        debug!("Stored client identity");
        Ok(())
    }

    pub fn private_key_pem(&self) -> Result<Option<RedactedSecret>, CredentialError> {
        Ok(self
            .storage
            .get(&self.key(PRIVATE_KEY)?)?
            .map(RedactedSecret::from))
    }

    pub fn certificate_chain_pem(&self) -> Result<Option<String>, CredentialError> {
        self.storage.get(&self.key(CERTIFICATE_CHAIN)?)
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        self.storage.remove(&self.key(PRIVATE_KEY)?)?;
        self.storage.remove(&self.key(CERTIFICATE_CHAIN)?)?;
        Ok(())
    }
}

impl CredentialSource for ClientIdentityStorage {
    fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError> {
        let (Some(private_key), Some(chain)) = (self.private_key_pem()?, self.certificate_chain_pem()?)
        else {
            return Ok(None);
        };

        ClientIdentity::from_pem(private_key.expose(), &chain)
            .map(Some)
            .map_err(|e| CredentialError::Decode {
                message: format!("Stored client identity is unreadable: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
