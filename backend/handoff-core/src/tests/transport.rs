use crate::error::transport::TransportError;
use crate::transport::trust::parse_certificates;
use crate::transport::{PinnedCertVerifier, TlsProtocols};

use rustls::client::danger::ServerCertVerifier;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{ServerName, UnixTime};

fn self_signed() -> rcgen::CertifiedKey {
    rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).expect("rcgen")
}

/// **VALUE**: Verifies that PEM input without certificates is a construction failure.
///
/// **WHY THIS MATTERS**: An empty pin set or anchor set would either trust nothing (every
/// handshake fails with a confusing error) or, worse, be treated as "no policy".
///
/// **BUG THIS CATCHES**: Would catch `parse_certificates` returning an empty list as success.
#[test]
fn given_pem_without_certificates_when_parsed_then_construction_error() {
    // GIVEN: Text that contains no PEM certificate blocks
    let pem = "this is not a certificate";

    // WHEN: Parsing it
    let result = parse_certificates(pem, "pinned certificate");

    // THEN: Construction fails
    assert!(matches!(result, Err(TransportError::Construction { .. })));
}

#[test]
fn given_chain_pem_when_parsed_then_every_certificate_returned() {
    let first = self_signed();
    let second = self_signed();
    let pem = format!("{}{}", first.cert.pem(), second.cert.pem());

    let certificates = parse_certificates(&pem, "chain").expect("parses");

    assert_eq!(certificates.len(), 2);
    assert_eq!(certificates[0].as_ref(), first.cert.der().as_ref());
    assert_eq!(certificates[1].as_ref(), second.cert.der().as_ref());
}

/// **VALUE**: Verifies that the pinned verifier accepts exactly the pinned certificate.
///
/// **WHY THIS MATTERS**: Pinning is the only check on the peer under this policy. If
/// another certificate slips through, any server on the network can impersonate the peer.
///
/// **BUG THIS CATCHES**: Would catch a comparison that matches on subject or SAN instead of
/// the full DER encoding (both rcgen certificates share the same subject).
#[test]
fn given_pinned_certificate_when_server_presents_other_cert_then_rejected() {
    // GIVEN: A verifier pinned to one certificate
    let pinned = self_signed();
    let impostor = self_signed();
    let verifier = PinnedCertVerifier::new(
        vec![pinned.cert.der().clone()],
        default_provider().signature_verification_algorithms,
    );
    let name = ServerName::try_from("localhost").expect("valid name");

    // WHEN: Verifying both certificates
    let trusted = verifier.verify_server_cert(pinned.cert.der(), &[], &name, &[], UnixTime::now());
    let rejected =
        verifier.verify_server_cert(impostor.cert.der(), &[], &name, &[], UnixTime::now());

    // THEN: Only the pinned one passes
    assert!(trusted.is_ok());
    assert!(rejected.is_err());
}

#[test]
fn given_protocol_families_when_versions_listed_then_tls13_only_excludes_tls12() {
    assert_eq!(TlsProtocols::default(), TlsProtocols::Tls12And13);
    assert_eq!(TlsProtocols::Tls12And13.versions().len(), 2);

    let only = TlsProtocols::Tls13Only.versions();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].version, rustls::ProtocolVersion::TLSv1_3);
}
