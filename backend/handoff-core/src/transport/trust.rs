use crate::error::transport::TransportError;

use std::sync::Arc;

use log::debug;
use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{
    CryptoProvider, WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature,
};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, RootCertStore, SignatureScheme};

/// How the remote certificate chain is judged.
#[derive(Debug, Clone)]
pub enum TrustPolicy {
    /// WebPKI path validation against these PEM-encoded roots.
    Anchored { roots_pem: String },
    /// The server's end-entity certificate must equal one of these.
    Pinned { certificates_pem: String },
    Custom(Arc<dyn ServerCertVerifier>),
}

impl TrustPolicy {
    /// Build the single evaluator every connection from one factory consults.
    pub(crate) fn verifier(
        &self,
        provider: &Arc<CryptoProvider>,
    ) -> Result<Arc<dyn ServerCertVerifier>, TransportError> {
        match self {
            TrustPolicy::Anchored { roots_pem } => {
                let mut roots = RootCertStore::empty();
                for certificate in parse_certificates(roots_pem, "trust anchor")? {
                    roots.add(certificate).map_err(|e| {
                        TransportError::construction("Unable to add trust anchor", e)
                    })?;
                }

                let verifier =
                    WebPkiServerVerifier::builder_with_provider(Arc::new(roots), Arc::clone(provider))
                        .build()
                        .map_err(|e| {
                            TransportError::construction("Unable to build chain verifier", e)
                        })?;
                Ok(verifier)
            }
            TrustPolicy::Pinned { certificates_pem } => {
                let pinned = parse_certificates(certificates_pem, "pinned certificate")?;
                Ok(Arc::new(PinnedCertVerifier::new(
                    pinned,
                    provider.signature_verification_algorithms,
                )))
            }
            TrustPolicy::Custom(verifier) => Ok(Arc::clone(verifier)),
        }
    }
}

/// Accepts only servers presenting one of a fixed set of certificates.
#[derive(Debug)]
pub struct PinnedCertVerifier {
    pinned: Vec<CertificateDer<'static>>,
    algorithms: WebPkiSupportedAlgorithms,
}

impl PinnedCertVerifier {
    pub fn new(pinned: Vec<CertificateDer<'static>>, algorithms: WebPkiSupportedAlgorithms) -> Self {
        Self { pinned, algorithms }
    }

    pub fn pinned(&self) -> &[CertificateDer<'static>] {
        &self.pinned
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        if self
            .pinned
            .iter()
            .any(|pinned| pinned.as_ref() == end_entity.as_ref())
        {
            Ok(ServerCertVerified::assertion())
        } else {
            debug!("Rejected unpinned certificate from {server_name:?}");
            Err(TlsError::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Every certificate in `pem`. No certificates at all is an error.
pub(crate) fn parse_certificates(
    pem: &str,
    what: &str,
) -> Result<Vec<CertificateDer<'static>>, TransportError> {
    let certificates = rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TransportError::construction(format!("Unable to parse {what} PEM"), e))?;

    if certificates.is_empty() {
        return Err(TransportError::construction(
            format!("No {what} found in PEM input"),
            format!("empty {what} set"),
        ));
    }

    Ok(certificates)
}
