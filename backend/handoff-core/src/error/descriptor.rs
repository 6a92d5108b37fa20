use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DescriptorError {
    #[error("Serialization Error: {message} {location}")]
    Serialize {
        message: String,
        location: ErrorLocation,
    },

    #[error("Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unsupported Mime Type Error: {message} {location}")]
    UnsupportedMimeType {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl From<url::ParseError> for DescriptorError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        DescriptorError::Validation {
            message: format!("Invalid provider URL: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
