//! Sync-first eISCP transport for Onkyo receivers
//!
//! Maintains one persistent TCP connection per receiver on a background
//! worker thread, translating zone commands through the catalog into eISCP
//! packets and receiver messages back into typed status events.
//!
//! # Behaviour
//!
//! - Commands complete when the receiver replies with the same ISCP code,
//!   fail on `N/A`, and time out after [`TransportConfig::command_timeout`]
//! - Replies are matched in request order; there are no correlation ids
//! - Dropped connections are re-established with capped exponential backoff
//! - After every connect the zone's power, volume, mute and input are queried
//!
//! # Architecture
//!
//! ```text
//! Transport (sync handle)
//!     │
//!     ├── command_tx ──► worker thread (current-thread tokio runtime)
//!     │                      │
//!     │                      ├── TcpStream ◄──► receiver
//!     │                      └── pending replies (FIFO per code)
//!     │
//!     └── event_rx ◄── TransportEvent
//! ```

pub mod backoff;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
mod transport;
mod worker;

pub use backoff::calculate_backoff;
pub use command::{CommandForm, ParseCommandError, ZoneCommand};
pub use config::{ReconnectConfig, TransportConfig};
pub use error::{Result, TransportError};
pub use event::{StatusNotification, StatusValue, StatusVerb, TransportEvent};
pub use transport::{CommandSink, Transport};
pub use worker::Completion;
