use handoff_core::error::{CredentialError, TransportError};
use handoff_core::store::{ClientIdentityStorage, MemoryDataSource};
use handoff_core::transport::{
    ClientIdentity, CredentialSource, SecureTransportFactory, TlsProtocols, TrustPolicy,
    create_secure_socket_factory,
};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::sync::Arc;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, SignatureScheme};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio_rustls::TlsAcceptor;

struct Issued {
    cert: Certificate,
    key: KeyPair,
}

impl Issued {
    fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    fn key_der(&self) -> PrivateKeyDer<'static> {
        PrivatePkcs8KeyDer::from(self.key.serialize_der()).into()
    }

    fn identity(&self) -> ClientIdentity {
        ClientIdentity::from_pem(&self.key.serialize_pem(), &self.cert.pem()).expect("valid identity")
    }
}

fn named(common_name: &str, subject_alt_names: Vec<String>) -> CertificateParams {
    let mut params = CertificateParams::new(subject_alt_names).expect("params");
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    params.distinguished_name = name;
    params
}

fn ca() -> Issued {
    let mut params = named("Handoff Test CA", Vec::new());
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key = KeyPair::generate().expect("key");
    let cert = params.self_signed(&key).expect("ca cert");
    Issued { cert, key }
}

fn leaf(ca: &Issued, common_name: &str, subject_alt_names: Vec<String>) -> Issued {
    let key = KeyPair::generate().expect("key");
    let cert = named(common_name, subject_alt_names)
        .signed_by(&key, &ca.cert, &ca.key)
        .expect("leaf cert");
    Issued { cert, key }
}

fn self_signed(name: &str) -> Issued {
    let key = KeyPair::generate().expect("key");
    let cert = named(name, vec![name.to_string()])
        .self_signed(&key)
        .expect("self-signed cert");
    Issued { cert, key }
}

fn server_config(server: &Issued, client_ca: Option<&Issued>) -> Arc<ServerConfig> {
    let provider = Arc::new(default_provider());
    let builder = ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .expect("protocol versions");

    let builder = match client_ca {
        Some(ca) => {
            let mut roots = RootCertStore::empty();
            roots.add(ca.der()).expect("client root");
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .expect("client verifier");
            builder.with_client_cert_verifier(verifier)
        }
        None => builder.with_no_client_auth(),
    };

    Arc::new(
        builder
            .with_single_cert(vec![server.der()], server.key_der())
            .expect("server cert"),
    )
}

struct NotInitializedSource;

impl CredentialSource for NotInitializedSource {
    fn client_identity(&self) -> Result<Option<ClientIdentity>, CredentialError> {
        Err(CredentialError::NotInitialized {
            message: "enrolment pending".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// **VALUE**: Verifies that a configured identity is offered no matter what the server asks.
///
/// **WHY THIS MATTERS**: Servers send CA hints and signature schemes. A resolver that
/// filters on them would silently present no certificate and the server would reject the
/// client as anonymous.
///
/// **BUG THIS CATCHES**: Would catch a resolver returning `None` for unknown issuers, or
/// building a new key per call.
#[test]
fn given_identity_when_factory_built_then_resolver_returns_same_key_for_any_hints() {
    // GIVEN: A client identity
    let client = self_signed("client");
    let trust = TrustPolicy::Pinned {
        certificates_pem: self_signed("server").cert.pem(),
    };

    // WHEN: Building a factory and asking its resolver with different hints
    let factory = create_secure_socket_factory(
        &trust,
        Some(&client.identity()),
        TlsProtocols::default(),
    )
    .expect("factory");
    let resolver = &factory.config().client_auth_cert_resolver;
    let unhinted = resolver.resolve(&[], &[]).expect("key offered");
    let hinted = resolver
        .resolve(
            &[b"CN=Some Other CA".as_slice()],
            &[SignatureScheme::RSA_PSS_SHA512],
        )
        .expect("key offered");

    // THEN: Same key and chain every time
    assert!(resolver.has_certs());
    assert!(Arc::ptr_eq(&unhinted, &hinted));
    assert_eq!(unhinted.cert.len(), 1);
    assert_eq!(unhinted.cert[0].as_ref(), client.cert.der().as_ref());
}

#[test]
fn given_no_identity_when_factory_built_then_no_client_certificates() {
    let trust = TrustPolicy::Anchored {
        roots_pem: ca().cert.pem(),
    };

    let factory =
        create_secure_socket_factory(&trust, None, TlsProtocols::Tls13Only).expect("factory");

    assert!(!factory.config().client_auth_cert_resolver.has_certs());
}

/// **VALUE**: Verifies that a bad pin set fails construction instead of degrading.
///
/// **WHY THIS MATTERS**: Falling back to "trust anything" or to system roots when the
/// pinned material is broken would defeat pinning entirely.
///
/// **BUG THIS CATCHES**: Would catch a factory built with an empty verifier after a parse
/// failure.
#[test]
fn given_malformed_pinned_pem_when_factory_built_then_construction_error() {
    // GIVEN: A pin set with a corrupted body
    let trust = TrustPolicy::Pinned {
        certificates_pem: "-----BEGIN CERTIFICATE-----\n%%%%\n-----END CERTIFICATE-----\n"
            .to_string(),
    };

    // WHEN: Building the factory
    let result = create_secure_socket_factory(&trust, None, TlsProtocols::default());

    // THEN: Construction fails, with the cause attached
    let Err(error) = result else {
        panic!("malformed pin set must not build a factory");
    };
    assert!(matches!(error, TransportError::Construction { .. }));
    assert!(std::error::Error::source(&error).is_some());
    assert!(error.to_string().contains("Transport Construction Failed"));
}

#[test]
fn given_key_not_matching_certificate_when_factory_built_then_construction_error() {
    let certificate = self_signed("client");
    let other_key = KeyPair::generate().expect("key");
    let identity = ClientIdentity::from_pem(&other_key.serialize_pem(), &certificate.cert.pem())
        .expect("parses");
    let trust = TrustPolicy::Pinned {
        certificates_pem: certificate.cert.pem(),
    };

    let result = create_secure_socket_factory(&trust, Some(&identity), TlsProtocols::default());

    assert!(matches!(result, Err(TransportError::Construction { .. })));
}

/// **VALUE**: Verifies that an enrolment still in progress yields a factory without identity.
///
/// **BUG THIS CATCHES**: Would catch `NotInitialized` being treated as fatal, which would
/// block the very handshake used to finish enrolment.
#[test]
fn given_uninitialized_credentials_when_factory_created_then_no_identity() {
    // GIVEN: A credential source that is not ready
    let trust = TrustPolicy::Anchored {
        roots_pem: ca().cert.pem(),
    };

    // WHEN: Creating the transport factory
    let transport =
        SecureTransportFactory::from_credentials(trust, TlsProtocols::default(), &NotInitializedSource)
            .expect("degrades");

    // THEN: No identity, and contexts still build
    assert!(transport.identity().is_none());
    let factory = transport.create_tls_socket_factory().expect("factory");
    assert!(!factory.config().client_auth_cert_resolver.has_certs());
}

#[test]
fn given_unreadable_stored_identity_when_factory_created_then_credentials_error() {
    let storage = ClientIdentityStorage::new(
        Arc::new(MemoryDataSource::new()),
        Some(url::Url::parse("https://gw.example").expect("url")),
    );
    storage
        .save_identity(&RedactedSecret::new("garbage"), "garbage")
        .expect("saves");
    let trust = TrustPolicy::Anchored {
        roots_pem: ca().cert.pem(),
    };

    let result = SecureTransportFactory::from_credentials(trust, TlsProtocols::default(), &storage);

    assert!(matches!(result, Err(TransportError::Credentials { .. })));
}

#[test]
fn given_transport_factory_when_called_twice_then_fresh_context_each_time() {
    let trust = TrustPolicy::Anchored {
        roots_pem: ca().cert.pem(),
    };
    let transport = SecureTransportFactory::new(trust, None, TlsProtocols::default());

    let first = transport.create_tls_socket_factory().expect("factory");
    let second = transport.create_tls_socket_factory().expect("factory");

    assert!(!Arc::ptr_eq(first.config(), second.config()));
}

/// **VALUE**: Mutual TLS over an in-memory link with CA-anchored trust on both sides.
///
/// **WHY THIS MATTERS**: This is what the socket owner does after pairing: upgrade the link
/// and authenticate both devices.
///
/// **BUG THIS CATCHES**: Would catch the client not presenting its identity, the anchors not
/// being used for verification, or the connector ignoring the server name.
#[tokio::test]
async fn given_anchored_trust_and_identity_when_connecting_then_mutual_tls_established() {
    // GIVEN: A CA issuing both server and client certificates
    let ca = ca();
    let server = leaf(&ca, "handoff server", vec!["localhost".to_string()]);
    let client = leaf(&ca, "handoff client", vec!["client.local".to_string()]);
    let acceptor = TlsAcceptor::from(server_config(&server, Some(&ca)));
    let factory = SecureTransportFactory::new(
        TrustPolicy::Anchored {
            roots_pem: ca.cert.pem(),
        },
        Some(client.identity()),
        TlsProtocols::default(),
    )
    .create_tls_socket_factory()
    .expect("factory");
    let (client_link, server_link) = duplex(16 * 1024);

    // WHEN: Both sides handshake and exchange a message
    let server_task = async {
        let mut tls = acceptor.accept(server_link).await.expect("server handshake");
        let presented = tls
            .get_ref()
            .1
            .peer_certificates()
            .map(|chain| chain.to_vec())
            .unwrap_or_default();
        let mut buffer = [0u8; 5];
        tls.read_exact(&mut buffer).await.expect("server read");
        (presented, buffer)
    };
    let client_task = async {
        let mut tls = factory
            .connect("localhost", client_link)
            .await
            .expect("client handshake");
        tls.write_all(b"hello").await.expect("client write");
        tls.flush().await.expect("client flush");
        tls
    };
    let ((presented, received), _client) = tokio::join!(server_task, client_task);

    // THEN: The server saw the client certificate and the payload
    assert_eq!(presented.len(), 1);
    assert_eq!(presented[0].as_ref(), client.cert.der().as_ref());
    assert_eq!(&received, b"hello");
}

#[tokio::test]
async fn given_pinned_trust_when_server_presents_unpinned_cert_then_handshake_error() {
    let pinned = self_signed("localhost");
    let impostor = self_signed("localhost");
    let acceptor = TlsAcceptor::from(server_config(&impostor, None));
    let factory = create_secure_socket_factory(
        &TrustPolicy::Pinned {
            certificates_pem: pinned.cert.pem(),
        },
        None,
        TlsProtocols::default(),
    )
    .expect("factory");
    let (client_link, server_link) = duplex(16 * 1024);

    let (server_result, client_result) = tokio::join!(
        acceptor.accept(server_link),
        factory.connect("localhost", client_link)
    );

    assert!(server_result.is_err());
    assert!(matches!(client_result, Err(TransportError::Handshake { .. })));
}

#[tokio::test]
async fn given_pinned_trust_when_server_presents_pinned_cert_then_handshake_succeeds() {
    let pinned = self_signed("localhost");
    let acceptor = TlsAcceptor::from(server_config(&pinned, None));
    let factory = create_secure_socket_factory(
        &TrustPolicy::Pinned {
            certificates_pem: pinned.cert.pem(),
        },
        None,
        TlsProtocols::Tls13Only,
    )
    .expect("factory");
    let (client_link, server_link) = duplex(16 * 1024);

    let (server_result, client_result) = tokio::join!(
        acceptor.accept(server_link),
        factory.connect("localhost", client_link)
    );

    assert!(server_result.is_ok());
    let client = client_result.expect("client handshake");
    assert_eq!(
        client.get_ref().1.protocol_version(),
        Some(rustls::ProtocolVersion::TLSv1_3)
    );
}

#[tokio::test]
async fn given_invalid_server_name_when_connecting_then_server_name_error() {
    let factory = create_secure_socket_factory(
        &TrustPolicy::Anchored {
            roots_pem: ca().cert.pem(),
        },
        None,
        TlsProtocols::default(),
    )
    .expect("factory");
    let (client_link, _server_link) = duplex(1024);

    let result = factory.connect("not a host name", client_link).await;

    assert!(matches!(result, Err(TransportError::ServerName { .. })));
}
