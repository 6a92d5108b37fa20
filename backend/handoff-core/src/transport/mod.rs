//! TLS client side of the handoff.
//!
//! A [`SecureTransportFactory`] turns a [`TrustPolicy`] and an optional
//! [`ClientIdentity`] into [`SecureSocketFactory`] values. Every call builds a
//! fresh rustls context; nothing is cached between calls and nothing falls
//! back to a weaker configuration when construction fails.

pub mod factory;
pub mod identity;
pub mod trust;

pub use factory::{SecureSocketFactory, SecureTransportFactory, create_secure_socket_factory};
pub use identity::{ClientIdentity, CredentialSource, SingleIdentityResolver};
pub use trust::{PinnedCertVerifier, TrustPolicy};

use rustls::SupportedProtocolVersion;
use serde::{Deserialize, Serialize};

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Protocol version family offered in the client hello.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsProtocols {
    #[default]
    Tls12And13,
    Tls13Only,
}

impl TlsProtocols {
    pub fn versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsProtocols::Tls12And13 => rustls::ALL_VERSIONS,
            TlsProtocols::Tls13Only => TLS13_ONLY,
        }
    }
}
