//! Console host: the render lifecycle as seen by a headless demo.

use handoff_core::renderer::{ErrorReporter, HandoffErrorCode, RenderHost};

use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};
use tokio::sync::Notify;
use url::Url;

pub struct ConsoleHost {
    provider_url: Url,
    polls: AtomicUsize,
    proceeds: AtomicUsize,
    proceeded: Notify,
}

impl ConsoleHost {
    pub fn new(provider_url: Url) -> Self {
        Self {
            provider_url,
            polls: AtomicUsize::new(0),
            proceeds: AtomicUsize::new(0),
            proceeded: Notify::new(),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn proceeds(&self) -> usize {
        self.proceeds.load(Ordering::SeqCst)
    }

    /// Resolves once `proceed()` has been called, including before this was awaited.
    pub async fn proceeded(&self) {
        self.proceeded.notified().await;
    }
}

impl RenderHost for ConsoleHost {
    fn provider_url(&self) -> Url {
        self.provider_url.clone()
    }

    fn poll(&self) {
        let count = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Polling {} (poll #{count})", self.provider_url);
    }

    fn proceed(&self) {
        self.proceeds.fetch_add(1, Ordering::SeqCst);
        info!("Pairing complete, proceeding");
        self.proceeded.notify_one();
    }

    fn on_render_completed(&self) {
        info!("Handoff screen ready");
    }

    fn close(&self) {
        info!("Handoff screen closed");
    }
}

/// Sends degradable broadcaster errors to the log.
#[derive(Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn on_error(
        &self,
        code: HandoffErrorCode,
        message: &str,
        cause: Option<&(dyn StdError + 'static)>,
    ) {
        match cause {
            Some(cause) => warn!("{code}: {message}: {cause}"),
            None => warn!("{code}: {message}"),
        }
    }
}
