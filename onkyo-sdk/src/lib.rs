//! # Onkyo SDK
//!
//! Control Onkyo/Integra receivers over eISCP and observe their state.
//!
//! ```rust,no_run
//! use onkyo_sdk::{OnkyoPlatform, PlatformConfig, VolumeDirection};
//!
//! fn main() -> Result<(), onkyo_sdk::SdkError> {
//!     let config = PlatformConfig::from_homebridge_path(PlatformConfig::default_homebridge_path()?)?;
//!     let platform = OnkyoPlatform::new(&config)?;
//!     let receiver = platform.require_receiver("Living Room")?;
//!
//!     // Intents return as soon as the optimistic update is applied
//!     receiver.set_power(true)?;
//!     receiver.set_volume_relative(VolumeDirection::Increment)?;
//!
//!     for change in receiver.subscribe() {
//!         println!("{:?} -> {:?} ({:?})", change.field, change.value, change.origin);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! OnkyoPlatform (one per config block)
//!     ↓
//! Receiver (one per zone) ── Dispatcher ──► onkyo-transport ──► receiver
//!     ↑                                          │
//! onkyo-state StateStore ◄── Reconciler ◄── TransportEvent
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod platform;
pub mod receiver;

pub use config::{PlatformConfig, ReceiverConfig, PLATFORM_NAME, PLUGIN_NAME};
pub use dispatcher::{Dispatcher, RemoteKey, VolumeDirection};
pub use error::{ConfigError, DispatchError, SdkError, UnsupportedRemoteKeyError};
pub use platform::OnkyoPlatform;
pub use receiver::{DeviceDescriptor, Receiver};

// Re-export commonly used types from the lower layers
pub use onkyo_catalog::{Catalog, InputSource, InputTable, Zone};
pub use onkyo_state::{
    init_logging, init_logging_from_env, ChangeIterator, ChangeOrigin, Field, FieldState,
    FieldValue, LoggingMode, ReceiverSnapshot, StateChange,
};
pub use onkyo_transport::{TransportConfig, ReconnectConfig};
