//! Renderer lifecycle integration.
//!
//! The host application drives renderers through a polling lifecycle that is
//! not part of this crate. A renderer sees that lifecycle through
//! [`RenderHost`] (what it can call back into) and implements [`Renderer`]
//! (the hooks the host calls). Failures a renderer can degrade around are
//! reported through an [`ErrorReporter`]; the default ignores them so policy
//! about surfacing errors stays with the owner.

mod handoff;
mod responder;

pub use handoff::HandoffBroadcaster;
pub use responder::HandoffResponder;

use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FormatResult};

use async_trait::async_trait;
use url::Url;

/// The polling lifecycle a renderer extends.
pub trait RenderHost: Send + Sync {
    /// URL of the provider backing the session.
    fn provider_url(&self) -> Url;

    /// Run one fallback poll cycle.
    fn poll(&self);

    /// Pairing succeeded; move on to the next protocol stage.
    fn proceed(&self);

    /// Base activation-completed behaviour.
    fn on_render_completed(&self);

    /// Base teardown.
    fn close(&self);
}

/// Hooks the host lifecycle calls on a renderer.
#[async_trait]
pub trait Renderer: Send {
    /// The renderer has been activated.
    async fn on_render_completed(&mut self);

    /// The renderer is being torn down.
    fn close(&mut self);

    /// Whether the host should start polling as soon as the renderer starts.
    fn start_polling_on_startup(&self) -> bool {
        true
    }
}

/// Degradable failures reported by the handoff broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffErrorCode {
    /// Broadcast capability missing or disabled.
    BroadcastUnavailable,
    /// Pairing listener could not initialize (no radio adapter).
    ListenerUnavailable,
    /// Radio adapter present but the endpoint could not be bound.
    ListenerBindFailed,
}

impl HandoffErrorCode {
    /// Numeric code exposed to hosts that match on integers.
    pub const fn code(self) -> i32 {
        match self {
            HandoffErrorCode::BroadcastUnavailable => 100,
            HandoffErrorCode::ListenerUnavailable => 101,
            HandoffErrorCode::ListenerBindFailed => 102,
        }
    }
}

impl Display for HandoffErrorCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            HandoffErrorCode::BroadcastUnavailable => "BroadcastUnavailable",
            HandoffErrorCode::ListenerUnavailable => "ListenerUnavailable",
            HandoffErrorCode::ListenerBindFailed => "ListenerBindFailed",
        };
        write!(formatter, "{name} ({})", self.code())
    }
}

/// Receives degradable renderer failures. Ignores them unless overridden.
pub trait ErrorReporter: Send + Sync {
    fn on_error(
        &self,
        _code: HandoffErrorCode,
        _message: &str,
        _cause: Option<&(dyn StdError + 'static)>,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreErrors;

impl ErrorReporter for IgnoreErrors {}
