use crate::error::listener::ListenerError;
use crate::pairing::state::{ListenerState, SharedState};
use crate::radio::{AdapterProvider, RendezvousEndpoint};
use crate::session::SessionIdentifier;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;

/// Invoked once when a peer completes the rendezvous.
pub type ProceedHook = Arc<dyn Fn() + Send + Sync>;

/// Where a started listener can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEndpoint {
    session: SessionIdentifier,
    address: String,
}

impl ListenerEndpoint {
    pub fn session(&self) -> SessionIdentifier {
        self.session
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Single-use rendezvous listener.
///
/// [`start`](Self::start) binds the endpoint and spawns the accept worker;
/// [`cancel`](Self::cancel) may be called from any thread, any number of
/// times. Dropping the listener cancels it.
pub struct PairingListener {
    service_name: String,
    state: Arc<SharedState>,
    endpoint: Option<Arc<dyn RendezvousEndpoint>>,
    worker: Option<JoinHandle<()>>,
}

impl PairingListener {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            state: Arc::new(SharedState::new()),
            endpoint: None,
            worker: None,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state.get()
    }

    /// How listening ended, once it has.
    pub fn outcome(&self) -> Option<ListenerState> {
        self.state.outcome()
    }

    /// Bind the rendezvous endpoint for `session` and start the accept worker.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::InvalidState`] if this listener was already started or cancelled
    /// - [`ListenerError::AdapterUnavailable`] if the host has no radio adapter
    /// - [`ListenerError::Bind`] if the adapter refused to bind the endpoint
    pub async fn start(
        &mut self,
        adapters: &dyn AdapterProvider,
        session: SessionIdentifier,
        proceed: ProceedHook,
    ) -> Result<ListenerEndpoint, ListenerError> {
        if self.state.get() != ListenerState::Created {
            return Err(ListenerError::InvalidState {
                message: format!("Listener cannot start from state {}", self.state.get()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let Some(adapter) = adapters.default_adapter() else {
            self.state
                .transition(ListenerState::Created, ListenerState::Failed);
            self.state.close();
            return Err(ListenerError::AdapterUnavailable {
                message: String::from("Unable to acquire radio adapter"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        adapter.cancel_discovery();

        let endpoint = match adapter.listen(&self.service_name, session).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                self.state
                    .transition(ListenerState::Created, ListenerState::Failed);
                self.state.close();
                return Err(ListenerError::Bind {
                    message: format!("Failed to bind rendezvous endpoint {}", self.service_name),
                    location: ErrorLocation::from(Location::caller()),
                    source: e,
                });
            }
        };

        let address = endpoint.local_address();

        if !self
            .state
            .transition(ListenerState::Created, ListenerState::Listening)
        {
            // Cancelled while binding
            close_endpoint(endpoint.as_ref());
            return Err(ListenerError::InvalidState {
                message: String::from("Listener was cancelled while binding"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Pairing listener for session {session} listening on {address}");

        self.endpoint = Some(Arc::clone(&endpoint));
        self.worker = Some(TokioSpawn(accept_and_proceed(
            endpoint,
            Arc::clone(&self.state),
            proceed,
        )));

        Ok(ListenerEndpoint { session, address })
    }

    /// Close the endpoint. A pending accept unblocks and ends silently.
    pub fn cancel(&self) {
        if self
            .state
            .transition(ListenerState::Listening, ListenerState::Cancelled)
        {
            debug!("Pairing listener cancelled while listening");
        } else if self
            .state
            .transition(ListenerState::Created, ListenerState::Closed)
        {
            debug!("Pairing listener cancelled before start");
        }

        if let Some(endpoint) = &self.endpoint {
            close_endpoint(endpoint.as_ref());
        }
    }

    /// Wait for the accept worker to finish, if one was started.
    pub async fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("Pairing listener worker ended abnormally: {e}");
            }
        }
    }
}

impl Drop for PairingListener {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Closes the endpoint and finalises the state however the worker exits.
struct WorkerGuard {
    endpoint: Arc<dyn RendezvousEndpoint>,
    state: Arc<SharedState>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        close_endpoint(self.endpoint.as_ref());
        let previous = self.state.close();
        debug!("Pairing listener closed after {previous}");
    }
}

/// The accept worker: one accept, at most one `proceed()`.
async fn accept_and_proceed(
    endpoint: Arc<dyn RendezvousEndpoint>,
    state: Arc<SharedState>,
    proceed: ProceedHook,
) {
    let guard = WorkerGuard {
        endpoint: Arc::clone(&endpoint),
        state: Arc::clone(&state),
    };

    match endpoint.accept().await {
        Ok(mut stream) => {
            if state.transition(ListenerState::Listening, ListenerState::Accepted) {
                info!("Pairing peer connected, proceeding");
                proceed();
            } else {
                debug!("Connection arrived after cancellation, dropping it");
            }

            if let Err(e) = stream.shutdown().await {
                debug!("Failed to close rendezvous connection: {e}");
            }
        }
        Err(e) => {
            if state.get() == ListenerState::Cancelled {
                // The endpoint was closed under us
                debug!("Pairing accept ended by cancellation: {e}");
            } else if state.transition(ListenerState::Listening, ListenerState::Failed) {
                warn!("Pairing accept failed: {e}");
            }
        }
    }

    drop(guard);
}

fn close_endpoint(endpoint: &dyn RendezvousEndpoint) {
    if let Err(e) = endpoint.close() {
        debug!("Failed to close rendezvous endpoint: {e}");
    }
}
