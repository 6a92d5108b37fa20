//! Session identifiers for handoff advertisements.
//!
//! A [`SessionIdentifier`] is generated once per advertisement attempt. It is
//! both the rendezvous discriminator the pairing listener binds with and the
//! correlation key carried in the broadcast payload, so anyone who received
//! the broadcast can find the listener and nobody else can.

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Random 128-bit identifier for one advertisement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentifier(Uuid);

impl SessionIdentifier {
    /// Generate a fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Raw 16-byte form, used as the wire preamble by byte-stream radios.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl From<Uuid> for SessionIdentifier {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for SessionIdentifier {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for SessionIdentifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        // Canonical hyphenated lowercase form
        write!(formatter, "{}", self.0.hyphenated())
    }
}
