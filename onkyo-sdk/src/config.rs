//! Homebridge platform configuration
//!
//! Receivers are configured in the `platforms` array of a Homebridge
//! `config.json`:
//!
//! ```json
//! {
//!   "platforms": [
//!     {
//!       "platform": "Onkyo",
//!       "receivers": [
//!         { "name": "Living Room", "ip_address": "192.168.1.40", "model": "TX-NR686", "zone": "main" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use onkyo_catalog::Zone;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::receiver::DeviceDescriptor;

/// Platform identifier in the Homebridge config
pub const PLATFORM_NAME: &str = "Onkyo";

/// Package name of the Homebridge plugin
pub const PLUGIN_NAME: &str = "homebridge-onkyo";

fn default_platform() -> String {
    PLATFORM_NAME.to_string()
}

fn default_zone() -> String {
    Zone::Main.as_str().to_string()
}

/// One configured receiver zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub ip_address: String,

    #[serde(default)]
    pub model: String,

    /// `main` or `zone2`
    #[serde(default = "default_zone")]
    pub zone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(
        default,
        rename = "avrManufacturer",
        skip_serializing_if = "Option::is_none"
    )]
    pub manufacturer: Option<String>,

    #[serde(default, rename = "avrSerial", skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl ReceiverConfig {
    pub fn new(name: impl Into<String>, ip_address: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_address: ip_address.into(),
            model: model.into(),
            zone: default_zone(),
            port: None,
            manufacturer: None,
            serial: None,
        }
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone.as_str().to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Check this entry; `index` is its position in the receivers list
    pub fn validate(&self, index: usize) -> Result<Zone, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName { index });
        }

        if self.ip_address.trim().is_empty() {
            return Err(ConfigError::MissingAddress {
                name: self.name.clone(),
            });
        }

        let zone = self
            .zone
            .trim()
            .parse::<Zone>()
            .map_err(|_| ConfigError::UnknownZone {
                name: self.name.clone(),
                zone: self.zone.clone(),
            })?;

        if self.model.trim().is_empty() {
            tracing::warn!("Receiver '{}' has no model; no inputs will be available", self.name);
        }

        Ok(zone)
    }

    /// Validate and convert into a device descriptor
    pub fn to_descriptor(&self, index: usize) -> Result<DeviceDescriptor, ConfigError> {
        let zone = self.validate(index)?;

        Ok(DeviceDescriptor {
            name: self.name.trim().to_string(),
            model: self.model.trim().to_string(),
            host: self.ip_address.trim().to_string(),
            port: self.port,
            zone,
            manufacturer: self.manufacturer.clone(),
            serial: self.serial.clone(),
        })
    }
}

/// The `Onkyo` platform block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            name: None,
            receivers: Vec::new(),
        }
    }
}

impl PlatformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_receiver(mut self, receiver: ReceiverConfig) -> Self {
        self.receivers.push(receiver);
        self
    }

    /// Parse a platform block
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a platform block from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read(path.as_ref())?)
    }

    /// Find the platform block in a full Homebridge config
    pub fn from_homebridge_json(json: &str) -> Result<Self, ConfigError> {
        let root: serde_json::Value = serde_json::from_str(json)?;

        let block = root
            .get("platforms")
            .and_then(|p| p.as_array())
            .and_then(|platforms| {
                platforms.iter().find(|p| {
                    p.get("platform").and_then(|name| name.as_str()) == Some(PLATFORM_NAME)
                })
            })
            .ok_or_else(|| ConfigError::PlatformNotFound(PLATFORM_NAME.to_string()))?;

        Ok(serde_json::from_value(block.clone())?)
    }

    /// Read a full Homebridge config file
    pub fn from_homebridge_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_homebridge_json(&read(path.as_ref())?)
    }

    /// `~/.homebridge/config.json`
    pub fn default_homebridge_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".homebridge").join("config.json"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Check every receiver entry
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, receiver) in self.receivers.iter().enumerate() {
            receiver.validate(index)?;
        }
        Ok(())
    }

    /// Descriptors for all receivers, failing on the first invalid entry
    pub fn descriptors(&self) -> Result<Vec<DeviceDescriptor>, ConfigError> {
        self.receivers
            .iter()
            .enumerate()
            .map(|(index, receiver)| receiver.to_descriptor(index))
            .collect()
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
