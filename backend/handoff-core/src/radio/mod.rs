//! Connection-oriented short-range radio abstraction.
//!
//! A [`RadioAdapter`] is the host's short-range link (Bluetooth RFCOMM, a LAN
//! socket, ...). The pairing listener uses it to bind a rendezvous endpoint
//! keyed by a session identifier; the responder uses it to connect back.
//!
//! # Cancellation
//!
//! Endpoints are cancelled by closing them. [`RendezvousEndpoint::close`] must
//! be callable from any thread, any number of times, and must make a pending
//! [`RendezvousEndpoint::accept`] return an I/O error.

pub mod tcp;

pub use tcp::TcpRadioAdapter;

use crate::session::SessionIdentifier;

use std::io::{Error as IoError, ErrorKind};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte stream over a radio link.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// Owned, type-erased radio connection.
pub type RadioStream = Box<dyn AsyncStream>;

#[async_trait]
pub trait RadioAdapter: Send + Sync {
    /// Stop any ongoing device discovery; scanning interferes with listening.
    fn cancel_discovery(&self);

    /// Bind a server-side endpoint discoverable only with `session`.
    async fn listen(
        &self,
        service_name: &str,
        session: SessionIdentifier,
    ) -> Result<Arc<dyn RendezvousEndpoint>, IoError>;

    /// Connect to a remote endpoint advertised at `address` under `session`.
    async fn connect(
        &self,
        address: &str,
        session: SessionIdentifier,
    ) -> Result<RadioStream, IoError>;
}

#[async_trait]
pub trait RendezvousEndpoint: Send + Sync {
    /// Address peers reach this endpoint at.
    fn local_address(&self) -> String;

    /// Wait for the next inbound connection that presents the right discriminator.
    async fn accept(&self) -> Result<RadioStream, IoError>;

    /// Close the endpoint. Idempotent.
    fn close(&self) -> Result<(), IoError>;
}

/// Resolves the host's radio adapter, if any.
pub trait AdapterProvider: Send + Sync {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>>;
}

/// Provider for hosts without a short-range radio.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRadio;

impl AdapterProvider for NoRadio {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>> {
        None
    }
}

/// The error a pending accept fails with once its endpoint has been closed.
pub fn endpoint_closed_error() -> IoError {
    IoError::new(ErrorKind::ConnectionAborted, "rendezvous endpoint closed")
}
