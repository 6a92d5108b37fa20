use crate::error::config::ConfigError;
use crate::radio::tcp::{DEFAULT_DISCRIMINATOR_TIMEOUT, TcpRadioAdapter};
use crate::transport::TlsProtocols;
use crate::{DEFAULT_SERVICE_NAME, HANDOFF_MIME_TYPE};

use common::ErrorLocation;

use std::net::{IpAddr, Ipv4Addr};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "handoff.json";
const CONFIG_DIR_NAME: &str = "handoff";
const CONFIG_VERSION: u32 = 1;
const MIN_DISCRIMINATOR_TIMEOUT_MS: u64 = 100;
const MAX_DISCRIMINATOR_TIMEOUT_MS: u64 = 60_000;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenerConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "default_discriminator_timeout_ms")]
    pub discriminator_timeout_ms: u64,
}

impl ListenerConfig {
    pub fn discriminator_timeout(&self) -> Duration {
        Duration::from_millis(self.discriminator_timeout_ms)
    }

    /// TCP rendezvous radio bound to `bind_address`.
    pub fn radio_adapter(&self) -> TcpRadioAdapter {
        TcpRadioAdapter::new(self.bind_address, self.discriminator_timeout())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            bind_address: default_bind_address(),
            discriminator_timeout_ms: default_discriminator_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BroadcastConfig {
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            mime_type: default_mime_type(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    #[serde(default)]
    pub protocols: TlsProtocols,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandoffConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub listener: ListenerConfig,

    #[serde(default)]
    pub broadcast: BroadcastConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            listener: ListenerConfig::default(),
            broadcast: BroadcastConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}
fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_discriminator_timeout_ms() -> u64 {
    DEFAULT_DISCRIMINATOR_TIMEOUT.as_millis() as u64
}
fn default_mime_type() -> String {
    HANDOFF_MIME_TYPE.to_string()
}

// ============================================
// IMPLEMENTATION
// ============================================

/// Platform config directory for the handoff host, e.g. `~/.config/handoff`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

impl HandoffConfig {
    /// Load config from {config_dir}/handoff.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(HandoffConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: HandoffConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/handoff.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.listener.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "listener.service_name cannot be empty".to_string(),
            });
        }

        let timeout = self.listener.discriminator_timeout_ms;
        if !(MIN_DISCRIMINATOR_TIMEOUT_MS..=MAX_DISCRIMINATOR_TIMEOUT_MS).contains(&timeout) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid discriminator timeout: {timeout}ms (must be {MIN_DISCRIMINATOR_TIMEOUT_MS}-{MAX_DISCRIMINATOR_TIMEOUT_MS})"
                ),
            });
        }

        // type/subtype, nothing else
        let mime = &self.broadcast.mime_type;
        let valid_mime = mime
            .split_once('/')
            .is_some_and(|(kind, subtype)| !kind.is_empty() && !subtype.is_empty())
            && !mime.contains(char::is_whitespace);
        if !valid_mime {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid MIME type: {mime}"),
            });
        }

        Ok(())
    }
}
