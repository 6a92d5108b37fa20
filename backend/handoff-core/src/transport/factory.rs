use crate::error::transport::TransportError;
use crate::transport::TlsProtocols;
use crate::transport::identity::{ClientIdentity, CredentialSource, SingleIdentityResolver};
use crate::transport::trust::TrustPolicy;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use rustls::ClientConfig;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

/// Build a TLS client factory for `trust`, presenting `identity` when given.
///
/// # Errors
///
/// Returns [`TransportError::Construction`] for anything that prevents the
/// context from being built: unparseable trust material, an unsupported key,
/// a key that does not match its certificate, or a provider refusing the
/// protocol versions.
pub fn create_secure_socket_factory(
    trust: &TrustPolicy,
    identity: Option<&ClientIdentity>,
    protocols: TlsProtocols,
) -> Result<SecureSocketFactory, TransportError> {
    let provider: Arc<CryptoProvider> = Arc::new(rustls::crypto::ring::default_provider());

    let verifier = trust.verifier(&provider)?;

    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(protocols.versions())
        .map_err(|e| TransportError::construction("Unsupported protocol versions", e))?
        .dangerous()
        .with_custom_certificate_verifier(verifier);

    let config = match identity {
        Some(identity) => {
            let key = identity.certified_key(&provider)?;
            builder.with_client_cert_resolver(Arc::new(SingleIdentityResolver::new(key)))
        }
        None => builder.with_no_client_auth(),
    };

    debug!(
        "Built TLS client context ({protocols:?}, client identity: {})",
        identity.is_some()
    );

    Ok(SecureSocketFactory::new(Arc::new(config)))
}

/// Holds the inputs a TLS context is derived from.
#[derive(Debug, Clone)]
pub struct SecureTransportFactory {
    trust: TrustPolicy,
    identity: Option<ClientIdentity>,
    protocols: TlsProtocols,
}

impl SecureTransportFactory {
    pub fn new(trust: TrustPolicy, identity: Option<ClientIdentity>, protocols: TlsProtocols) -> Self {
        Self {
            trust,
            identity,
            protocols,
        }
    }

    /// Read the client identity from `source` once.
    ///
    /// A source that is not initialized yet degrades to no client identity;
    /// any other credential failure is returned.
    pub fn from_credentials(
        trust: TrustPolicy,
        protocols: TlsProtocols,
        source: &dyn CredentialSource,
    ) -> Result<Self, TransportError> {
        let identity = match source.client_identity() {
            Ok(identity) => identity,
            Err(e) if e.is_not_initialized() => {
                info!("Credential store not initialized, continuing without client identity");
                None
            }
            Err(e) => {
                warn!("Unable to read client identity: {e}");
                return Err(TransportError::Credentials {
                    message: String::from("Unable to read client identity"),
                    location: ErrorLocation::from(Location::caller()),
                    source: e,
                });
            }
        };

        Ok(Self::new(trust, identity, protocols))
    }

    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    pub fn protocols(&self) -> TlsProtocols {
        self.protocols
    }

    /// A fresh context on every call.
    pub fn create_tls_socket_factory(&self) -> Result<SecureSocketFactory, TransportError> {
        create_secure_socket_factory(&self.trust, self.identity.as_ref(), self.protocols)
    }
}

/// Upgrades established links to TLS with one fixed client context.
#[derive(Clone)]
pub struct SecureSocketFactory {
    config: Arc<ClientConfig>,
    connector: TlsConnector,
}

impl SecureSocketFactory {
    fn new(config: Arc<ClientConfig>) -> Self {
        let connector = TlsConnector::from(Arc::clone(&config));
        Self { config, connector }
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// Run the client handshake over `stream`, verifying the peer as `server_name`.
    pub async fn connect<IO>(
        &self,
        server_name: &str,
        stream: IO,
    ) -> Result<TlsStream<IO>, TransportError>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        let name = ServerName::try_from(server_name.to_string()).map_err(|e| {
            TransportError::ServerName {
                message: format!("Invalid server name {server_name:?}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let tls = self
            .connector
            .connect(name, stream)
            .await
            .map_err(|e| TransportError::Handshake {
                message: format!("TLS handshake with {server_name} failed"),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        debug!("TLS session established with {server_name}");
        Ok(tls)
    }
}
