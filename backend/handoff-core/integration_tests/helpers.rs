use handoff_core::broadcast::BroadcastProvider;
use handoff_core::broadcast::loopback::LoopbackBroadcast;
use handoff_core::radio::{AdapterProvider, RadioAdapter, RadioStream, RendezvousEndpoint, TcpRadioAdapter};
use handoff_core::renderer::{ErrorReporter, HandoffErrorCode, RenderHost};
use handoff_core::session::SessionIdentifier;

use std::error::Error as StdError;
use std::io::{Error as IoError, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

pub const PROVIDER_URL: &str = "https://svc.example/";

/// Counts every lifecycle call the broadcaster makes into its host.
#[derive(Default)]
pub struct RecordingHost {
    pub polls: AtomicUsize,
    pub proceeds: AtomicUsize,
    pub render_completions: AtomicUsize,
    pub closes: AtomicUsize,
    proceeded: Notify,
}

impl RecordingHost {
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn proceeds(&self) -> usize {
        self.proceeds.load(Ordering::SeqCst)
    }

    pub fn render_completions(&self) -> usize {
        self.render_completions.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Wait for `proceed()`, failing the test after a few seconds.
    pub async fn wait_for_proceed(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.proceeded.notified())
            .await
            .expect("proceed() was not called");
    }
}

impl RenderHost for RecordingHost {
    fn provider_url(&self) -> Url {
        Url::parse(PROVIDER_URL).expect("valid provider URL")
    }

    fn poll(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }

    fn proceed(&self) {
        self.proceeds.fetch_add(1, Ordering::SeqCst);
        self.proceeded.notify_one();
    }

    fn on_render_completed(&self) {
        self.render_completions.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps every reported error code in order.
#[derive(Default)]
pub struct RecordingReporter {
    codes: Mutex<Vec<HandoffErrorCode>>,
}

impl RecordingReporter {
    pub fn codes(&self) -> Vec<HandoffErrorCode> {
        self.codes.lock().expect("reporter lock").clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn on_error(
        &self,
        code: HandoffErrorCode,
        _message: &str,
        _cause: Option<&(dyn StdError + 'static)>,
    ) {
        self.codes.lock().expect("reporter lock").push(code);
    }
}

/// Adapter whose endpoint can never be bound.
pub struct UnbindableRadio;

#[async_trait]
impl RadioAdapter for UnbindableRadio {
    fn cancel_discovery(&self) {}

    async fn listen(
        &self,
        _service_name: &str,
        _session: SessionIdentifier,
    ) -> Result<Arc<dyn RendezvousEndpoint>, IoError> {
        Err(IoError::new(ErrorKind::AddrInUse, "service channel busy"))
    }

    async fn connect(
        &self,
        _address: &str,
        _session: SessionIdentifier,
    ) -> Result<RadioStream, IoError> {
        Err(IoError::new(ErrorKind::ConnectionRefused, "unreachable"))
    }
}

impl AdapterProvider for UnbindableRadio {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>> {
        Some(Arc::new(UnbindableRadio))
    }
}

/// Loopback TCP adapter that records the order of adapter calls.
pub struct OrderRecordingRadio {
    inner: TcpRadioAdapter,
    pub calls: Mutex<Vec<&'static str>>,
}

impl OrderRecordingRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: TcpRadioAdapter::loopback(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RadioAdapter for OrderRecordingRadio {
    fn cancel_discovery(&self) {
        self.calls.lock().expect("calls lock").push("cancel_discovery");
        self.inner.cancel_discovery();
    }

    async fn listen(
        &self,
        service_name: &str,
        session: SessionIdentifier,
    ) -> Result<Arc<dyn RendezvousEndpoint>, IoError> {
        self.calls.lock().expect("calls lock").push("listen");
        self.inner.listen(service_name, session).await
    }

    async fn connect(
        &self,
        address: &str,
        session: SessionIdentifier,
    ) -> Result<RadioStream, IoError> {
        self.inner.connect(address, session).await
    }
}

pub struct SharedRadio(pub Arc<OrderRecordingRadio>);

impl AdapterProvider for SharedRadio {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>> {
        Some(Arc::clone(&self.0) as Arc<dyn RadioAdapter>)
    }
}

pub fn loopback_broadcast(broadcast: &Arc<LoopbackBroadcast>) -> Arc<dyn BroadcastProvider> {
    Arc::new(Arc::clone(broadcast))
}

pub fn tcp_radio() -> Arc<dyn AdapterProvider> {
    Arc::new(Arc::new(TcpRadioAdapter::loopback()))
}

/// Binds fine, then fails the accept with a link error that is not a cancellation.
pub struct BrokenLinkRadio;

struct BrokenLinkEndpoint;

#[async_trait]
impl RendezvousEndpoint for BrokenLinkEndpoint {
    fn local_address(&self) -> String {
        String::from("broken-link")
    }

    async fn accept(&self) -> Result<RadioStream, IoError> {
        Err(IoError::new(ErrorKind::BrokenPipe, "radio link dropped"))
    }

    fn close(&self) -> Result<(), IoError> {
        Ok(())
    }
}

#[async_trait]
impl RadioAdapter for BrokenLinkRadio {
    fn cancel_discovery(&self) {}

    async fn listen(
        &self,
        _service_name: &str,
        _session: SessionIdentifier,
    ) -> Result<Arc<dyn RendezvousEndpoint>, IoError> {
        Ok(Arc::new(BrokenLinkEndpoint))
    }

    async fn connect(
        &self,
        _address: &str,
        _session: SessionIdentifier,
    ) -> Result<RadioStream, IoError> {
        Err(IoError::new(ErrorKind::ConnectionRefused, "unreachable"))
    }
}

impl AdapterProvider for BrokenLinkRadio {
    fn default_adapter(&self) -> Option<Arc<dyn RadioAdapter>> {
        Some(Arc::new(BrokenLinkRadio))
    }
}
