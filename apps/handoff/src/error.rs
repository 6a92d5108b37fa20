use common::ErrorLocation;

use thiserror::Error;

/// Errors surfaced by the handoff host application.
///
/// Core errors are flattened into messages here; their own display already
/// carries the location they were raised at.
#[derive(Debug, Error)]
pub enum HandoffAppError {
    /// Error from this App
    #[error("Handoff Error: {message} {location}")]
    Handoff {
        message: String,
        location: ErrorLocation,
    },

    /// Error from handoff-core operations (config, pairing, transport)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The peer never completed the rendezvous
    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}
