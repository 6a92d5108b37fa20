//! One complete handoff inside a single process.
//!
//! The initiator advertises over a loopback broadcast channel, a responder
//! picks the record up, dials the initiator's pairing listener over the TCP
//! radio and the initiator proceeds.

use crate::error::HandoffAppError;
use crate::host::{ConsoleHost, LogReporter};

use handoff_core::broadcast::LoopbackBroadcast;
use handoff_core::config::HandoffConfig;
use handoff_core::descriptor::HandoffDescriptor;
use handoff_core::radio::RadioStream;
use handoff_core::renderer::{HandoffBroadcaster, HandoffResponder, Renderer};
use handoff_core::session::SessionIdentifier;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info};
use tokio::time::{sleep as TokioSleep, timeout};
use url::Url;

pub const DEMO_PROVIDER_URL: &str = "https://localhost:8443/";

const CONNECT_MAX_ELAPSED: Duration = Duration::from_secs(5);
const PROCEED_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened during a demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffReport {
    pub session: SessionIdentifier,
    pub address: Option<String>,
    pub polls: usize,
    pub proceeds: usize,
}

/// Run one handoff with `config` and report the outcome.
///
/// # Errors
///
/// - [`HandoffAppError::Core`] if advertising, decoding or connecting fails
/// - [`HandoffAppError::Timeout`] if the initiator never proceeds
pub async fn run(config: &HandoffConfig) -> Result<HandoffReport, HandoffAppError> {
    let provider_url = Url::parse(DEMO_PROVIDER_URL).map_err(|e| HandoffAppError::Handoff {
        message: format!("Invalid provider URL: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let host = Arc::new(ConsoleHost::new(provider_url));
    let broadcast = Arc::new(LoopbackBroadcast::new());
    let radio = Arc::new(config.listener.radio_adapter());

    let mut broadcaster = HandoffBroadcaster::new(
        host.clone(),
        Arc::new(Arc::clone(&broadcast)),
        Arc::new(Arc::clone(&radio)),
    )
    .with_config(config)
    .with_error_reporter(Arc::new(LogReporter));

    broadcaster.on_render_completed().await;

    let message = broadcast.exchange().ok_or_else(|| HandoffAppError::Handoff {
        message: String::from("Nothing was advertised"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let responder =
        HandoffResponder::new(Arc::new(Arc::clone(&radio))).with_mime_type(&config.broadcast.mime_type);
    let descriptor = responder.receive(&message).map_err(|e| HandoffAppError::Core {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let _link = connect_with_retry(&responder, &descriptor).await?;

    timeout(PROCEED_TIMEOUT, host.proceeded())
        .await
        .map_err(|_| HandoffAppError::Timeout {
            message: format!(
                "Initiator did not proceed within {PROCEED_TIMEOUT:?} for session {}",
                descriptor.session()
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

    broadcaster.wait_for_listener().await;
    broadcaster.close();

    let report = HandoffReport {
        session: descriptor.session(),
        address: descriptor.address().map(String::from),
        polls: host.polls(),
        proceeds: host.proceeds(),
    };
    info!("Handoff finished: {report:?}");
    Ok(report)
}

async fn connect_with_retry(
    responder: &HandoffResponder,
    descriptor: &HandoffDescriptor,
) -> Result<RadioStream, HandoffAppError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(CONNECT_MAX_ELAPSED),
        ..Default::default()
    };

    loop {
        let error = match responder.connect(descriptor).await {
            Ok(stream) => return Ok(stream),
            Err(e) => e,
        };

        match backoff.next_backoff() {
            Some(duration) => {
                debug!("Rendezvous not reachable yet, retrying after {duration:?}: {error}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(HandoffAppError::Core {
                    message: format!("Gave up connecting after {CONNECT_MAX_ELAPSED:?}: {error}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
