use std::time::Duration;

use thiserror::Error;

/// Errors reported by the receiver connection
///
/// All variants are recoverable: the connection actor keeps running and the
/// handle stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// TCP connection could not be established
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    /// Writing a packet to an open connection failed
    #[error("Failed to write to receiver: {0}")]
    Write(String),

    /// The receiver answered `N/A`
    #[error("Receiver rejected command {command}")]
    Rejected { command: String },

    /// No reply arrived within the command timeout
    #[error("No reply to command {command} within {after:?}")]
    Timeout { command: String, after: Duration },

    /// The command was issued while no connection was open, or the
    /// connection dropped before the reply
    #[error("Not connected to receiver")]
    NotConnected,

    /// The catalog could not translate the command
    #[error("Failed to translate command: {0}")]
    Translate(#[from] onkyo_catalog::CatalogError),

    /// A malformed packet arrived
    #[error("Malformed packet from receiver: {0}")]
    Frame(#[from] eiscp_client::FrameError),

    /// The connection actor has stopped
    #[error("Transport has been shut down")]
    Shutdown,

    /// Invalid transport settings
    #[error("Invalid transport configuration: {0}")]
    Configuration(String),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
