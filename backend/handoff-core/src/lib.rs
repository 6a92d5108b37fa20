pub mod broadcast;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod pairing;
pub mod radio;
pub mod renderer;
pub mod session;
pub mod store;
pub mod transport;

#[cfg(test)]
mod tests;

pub const HANDOFF_VENDOR: &str = "com.ca.mas.core";
pub const HANDOFF_MIME_TYPE: &str = const_format::concatcp!("application/vnd.", HANDOFF_VENDOR, ".beam");
pub const DEFAULT_SERVICE_NAME: &str = "HandoffRenderer";
