//! Receiver state tracking for onkyo-sdk
//!
//! Keeps the power, mute, volume and input state of one receiver zone in
//! sync with the receiver and notifies observers of every change.
//!
//! # Features
//!
//! - **Typed fields**: `Power`, `Mute`, `Volume`, `ActiveInput`, each
//!   `Unknown` until reported
//! - **Change detection**: writing the current value again notifies nobody
//! - **Origins**: every change says whether it came from the receiver, an
//!   optimistic write, a revert, or a reconnect reset
//! - **Blocking iteration**: consume changes without async/await
//!
//! # Architecture
//!
//! ```text
//! Transport ── TransportEvent ──► reconciler thread
//!                                      │
//!                                      ▼
//! Dispatcher ── optimistic/revert ──► StateStore ──► ChangeIterator (per subscriber)
//! ```

pub mod decoder;
pub mod error;
pub mod event;
pub mod iter;
pub mod logging;
pub mod property;
pub mod reconciler;
pub mod store;

pub use decoder::{decode_status, PropertyChange};
pub use error::{Result, StateError};
pub use event::{ChangeOrigin, StateChange};
pub use iter::{ChangeIterator, TimeoutIter, TryIter};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use property::{
    ActiveInput, Field, FieldState, FieldValue, Mute, Power, Property, ReceiverState, Volume,
};
pub use reconciler::{spawn_reconciler, Reconciler};
pub use store::{ReceiverSnapshot, StateStore};
