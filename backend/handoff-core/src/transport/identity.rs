use crate::error::credential::CredentialError;
use crate::error::transport::TransportError;
use crate::transport::trust::parse_certificates;

use std::fmt;
use std::sync::Arc;

use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{Error as TlsError, InconsistentKeys, SignatureScheme};

/// Private key and certificate chain presented for client authentication.
pub struct ClientIdentity {
    private_key: PrivateKeyDer<'static>,
    certificate_chain: Vec<CertificateDer<'static>>,
}

impl ClientIdentity {
    pub fn new(
        private_key: PrivateKeyDer<'static>,
        certificate_chain: Vec<CertificateDer<'static>>,
    ) -> Self {
        Self {
            private_key,
            certificate_chain,
        }
    }

    /// Parse a PEM private key (PKCS#8, PKCS#1 or SEC1) and a PEM chain, leaf first.
    pub fn from_pem(private_key_pem: &str, certificate_chain_pem: &str) -> Result<Self, TransportError> {
        let private_key = rustls_pemfile::private_key(&mut private_key_pem.as_bytes())
            .map_err(|e| TransportError::construction("Unable to parse client key PEM", e))?
            .ok_or_else(|| {
                TransportError::construction(
                    "No private key found in PEM input",
                    "missing client private key",
                )
            })?;

        let certificate_chain = parse_certificates(certificate_chain_pem, "client certificate")?;

        Ok(Self::new(private_key, certificate_chain))
    }

    pub fn certificate_chain(&self) -> &[CertificateDer<'static>] {
        &self.certificate_chain
    }

    /// Load the key with `provider` and pair it with the chain.
    pub(crate) fn certified_key(
        &self,
        provider: &CryptoProvider,
    ) -> Result<Arc<CertifiedKey>, TransportError> {
        if self.certificate_chain.is_empty() {
            return Err(TransportError::construction(
                "Client identity has no certificates",
                "empty certificate chain",
            ));
        }

        let signing_key = provider
            .key_provider
            .load_private_key(self.private_key.clone_key())
            .map_err(|e| TransportError::construction("Unsupported client key", e))?;

        let certified = CertifiedKey::new(self.certificate_chain.clone(), signing_key);

        match certified.keys_match() {
            // Providers that cannot expose the public key get the benefit of the doubt
            Ok(()) | Err(TlsError::InconsistentKeys(InconsistentKeys::Unknown)) => {
                Ok(Arc::new(certified))
            }
            Err(e) => Err(TransportError::construction(
                "Client key does not match certificate",
                e,
            )),
        }
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            private_key: self.private_key.clone_key(),
            certificate_chain: self.certificate_chain.clone(),
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("private_key", &"[REDACTED]")
            .field("certificate_chain", &self.certificate_chain.len())
            .finish()
    }
}

/// Where a factory gets its client identity from.
pub trait CredentialSource: Send + Sync {
    /// `Ok(None)` when nothing is enrolled yet;
    /// [`CredentialError::NotInitialized`] when the store itself is not ready.
    fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError>;
}

/// Always answers with the same key and chain, whatever the server asks for.
#[derive(Debug)]
pub struct SingleIdentityResolver {
    key: Arc<CertifiedKey>,
}

impl SingleIdentityResolver {
    pub fn new(key: Arc<CertifiedKey>) -> Self {
        Self { key }
    }
}

impl ResolvesClientCert for SingleIdentityResolver {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.key))
    }

    fn has_certs(&self) -> bool {
        true
    }
}
