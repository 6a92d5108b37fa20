//! Shared building blocks for the handoff workspace.
//!
//! This crate holds the small pieces every other crate leans on: source
//! location capture for error values and secret wrappers that never leak
//! their contents into logs.
//!
//! ## Architecture
//!
//! - **common** (this crate): error plumbing and secret handling
//! - **handoff-core**: pairing, broadcast and secure transport logic
//! - **handoff**: host application wiring everything together

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
