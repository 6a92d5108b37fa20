//! Rendezvous radio over TCP.
//!
//! TCP has no service records, so the session discriminator travels in-band:
//! a connecting peer writes the 16 raw bytes of the session identifier first.
//! The endpoint silently drops connections whose preamble is missing, late or
//! wrong and keeps waiting, so only a peer that saw the broadcast can complete
//! the rendezvous. Preambles are read concurrently; closing the endpoint drops
//! every check still in flight.

use crate::radio::{
    AdapterProvider, RadioAdapter, RadioStream, RendezvousEndpoint, endpoint_closed_error,
};
use crate::session::SessionIdentifier;

use std::io::Error as IoError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;

pub const DEFAULT_DISCRIMINATOR_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TcpRadioAdapter {
    bind_ip: IpAddr,
    discriminator_timeout: Duration,
}

impl TcpRadioAdapter {
    pub fn new(bind_ip: IpAddr, discriminator_timeout: Duration) -> Self {
        Self {
            bind_ip,
            discriminator_timeout,
        }
    }

    /// Adapter bound to `127.0.0.1`.
    pub fn loopback() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_DISCRIMINATOR_TIMEOUT)
    }
}

#[async_trait]
impl RadioAdapter for TcpRadioAdapter {
    fn cancel_discovery(&self) {
        // Nothing scans on TCP
        debug!("TCP radio has no discovery to cancel");
    }

    async fn listen(
        &self,
        service_name: &str,
        session: SessionIdentifier,
    ) -> Result<Arc<dyn RendezvousEndpoint>, IoError> {
        let listener = TcpListener::bind((self.bind_ip, 0)).await?;
        let address = listener.local_addr()?.to_string();

        info!("Rendezvous endpoint {service_name} listening on {address}");

        let (closed, _) = watch::channel(false);

        Ok(Arc::new(TcpRendezvousEndpoint {
            listener: Mutex::new(Some(Arc::new(listener))),
            closed,
            session,
            address,
            discriminator_timeout: self.discriminator_timeout,
        }))
    }

    async fn connect(
        &self,
        address: &str,
        session: SessionIdentifier,
    ) -> Result<RadioStream, IoError> {
        let mut stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        stream.write_all(session.as_bytes()).await?;
        stream.flush().await?;

        debug!("Connected to rendezvous endpoint at {address}");
        Ok(Box::new(stream))
    }
}

impl AdapterProvider for Arc<TcpRadioAdapter> {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>> {
        Some(Arc::clone(self) as Arc<dyn RadioAdapter>)
    }
}

struct TcpRendezvousEndpoint {
    listener: Mutex<Option<Arc<TcpListener>>>,
    closed: watch::Sender<bool>,
    session: SessionIdentifier,
    address: String,
    discriminator_timeout: Duration,
}

impl TcpRendezvousEndpoint {
    async fn accept_matching(&self, listener: &TcpListener) -> Result<RadioStream, IoError> {
        // One check per connection so a silent peer cannot hold up the others
        let mut checks = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    checks.spawn(check_discriminator(
                        stream,
                        peer,
                        self.session,
                        self.discriminator_timeout,
                    ));
                }
                Some(checked) = checks.join_next() => {
                    if let Ok(Some(stream)) = checked {
                        return Ok(Box::new(stream));
                    }
                }
            }
        }
    }
}

/// The stream back if `peer` opens with `session`'s bytes within `limit`.
async fn check_discriminator(
    mut stream: TcpStream,
    peer: SocketAddr,
    session: SessionIdentifier,
    limit: Duration,
) -> Option<TcpStream> {
    let mut preamble = [0u8; 16];
    match timeout(limit, stream.read_exact(&mut preamble)).await {
        Ok(Ok(_)) if preamble == *session.as_bytes() => {
            debug!("Rendezvous peer {peer} presented the session discriminator");
            Some(stream)
        }
        Ok(Ok(_)) => {
            warn!("Rejected rendezvous peer {peer}: discriminator mismatch");
            None
        }
        Ok(Err(e)) => {
            warn!("Rejected rendezvous peer {peer}: {e}");
            None
        }
        Err(_) => {
            warn!("Rejected rendezvous peer {peer}: discriminator timed out");
            None
        }
    }
}

#[async_trait]
impl RendezvousEndpoint for TcpRendezvousEndpoint {
    fn local_address(&self) -> String {
        self.address.clone()
    }

    async fn accept(&self) -> Result<RadioStream, IoError> {
        let listener = self
            .listener
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(Arc::clone))
            .ok_or_else(endpoint_closed_error)?;

        let mut closed = self.closed.subscribe();

        tokio::select! {
            result = self.accept_matching(&listener) => result,
            _ = closed.wait_for(|is_closed| *is_closed) => Err(endpoint_closed_error()),
        }
    }

    fn close(&self) -> Result<(), IoError> {
        self.closed.send_replace(true);

        // Dropping the last Arc releases the OS socket
        if let Ok(mut guard) = self.listener.lock() {
            if guard.take().is_some() {
                debug!("Rendezvous endpoint {} closed", self.address);
            }
        }

        Ok(())
    }
}
