use std::path::PathBuf;

use thiserror::Error;

/// A remote key identifier with no receiver command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported remote key {code}")]
pub struct UnsupportedRemoteKeyError {
    pub code: u8,
}

/// Caller errors rejected before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidInputIndex(#[from] onkyo_catalog::InvalidInputIndexError),

    #[error(transparent)]
    UnsupportedRemoteKey(#[from] UnsupportedRemoteKeyError),

    #[error("Volume {level} is out of range [{min}, {max}]")]
    VolumeOutOfRange { level: u8, min: u8, max: u8 },
}

/// Errors in the platform configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No '{0}' platform entry in Homebridge config")]
    PlatformNotFound(String),

    #[error("Receiver #{index} has no name")]
    MissingName { index: usize },

    #[error("Receiver '{name}' has no ip_address")]
    MissingAddress { name: String },

    #[error("Receiver '{name}' has unknown zone '{zone}'")]
    UnknownZone { name: String, zone: String },

    #[error("Could not determine the home directory")]
    NoHomeDirectory,
}

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Command catalog error: {0}")]
    Catalog(#[from] onkyo_catalog::CatalogLoadError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Transport error: {0}")]
    Transport(#[from] onkyo_transport::TransportError),

    #[error("State error: {0}")]
    State(#[from] onkyo_state::StateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Receiver not found: {0}")]
    ReceiverNotFound(String),
}
