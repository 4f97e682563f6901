//! Connection settings for the receiver transport

use std::time::Duration;

use crate::error::{Result, TransportError};

/// Exponential backoff for reconnection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt
    /// Default: 500 ms
    pub initial_delay: Duration,

    /// Upper bound on the backoff delay before jitter
    /// Default: 5 seconds
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            max_retries: None,
        }
    }
}

/// Configuration for one receiver connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// TCP port used when a device does not name one
    /// Default: 60128
    pub port: u16,

    /// Reconnect after the connection drops or fails
    /// Default: true
    pub auto_reconnect: bool,

    /// Backoff between reconnection attempts
    pub reconnect: ReconnectConfig,

    /// How long a command waits for the receiver's reply
    /// Default: 3 seconds
    pub command_timeout: Duration,

    /// Timeout for establishing the TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Query power, volume, mute and input after every (re)connect
    /// Default: true
    pub query_on_connect: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: eiscp_client::DEFAULT_PORT,
            auto_reconnect: true,
            reconnect: ReconnectConfig::default(),
            command_timeout: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(5),
            query_on_connect: true,
        }
    }
}

impl TransportConfig {
    /// Create a TransportConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_query_on_connect(mut self, enabled: bool) -> Self {
        self.query_on_connect = enabled;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(TransportError::Configuration(
                "Port must be greater than 0".to_string(),
            ));
        }

        if self.command_timeout == Duration::ZERO {
            return Err(TransportError::Configuration(
                "Command timeout must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout == Duration::ZERO {
            return Err(TransportError::Configuration(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.initial_delay == Duration::ZERO {
            return Err(TransportError::Configuration(
                "Initial reconnect delay must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.initial_delay > self.reconnect.max_delay {
            return Err(TransportError::Configuration(
                "Invalid reconnect delay: initial must not exceed max".to_string(),
            ));
        }

        Ok(())
    }
}
