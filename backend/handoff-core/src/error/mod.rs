pub mod config;
pub mod credential;
pub mod descriptor;
pub mod listener;
pub mod transport;

pub use config::ConfigError;
pub use credential::CredentialError;
pub use descriptor::DescriptorError;
pub use listener::ListenerError;
pub use transport::TransportError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
