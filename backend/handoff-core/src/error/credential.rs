use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CredentialError {
    /// The store has no connected gateway yet (enrollment still in progress).
    #[error("Not Initialized Error: {message} {location}")]
    NotInitialized {
        message: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Storage Error: {message} {location}")]
    Storage {
        message: String,
        location: ErrorLocation,
    },
}

impl CredentialError {
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, CredentialError::NotInitialized { .. })
    }
}
