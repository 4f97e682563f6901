//! Typed receiver properties
//!
//! Each tracked capability of a zone is a small newtype implementing
//! [`Property`], so the store can be read and written by type:
//!
//! ```rust
//! use onkyo_state::{ChangeOrigin, FieldState, StateStore, Volume};
//!
//! let store = StateStore::new();
//! assert_eq!(store.get::<Volume>(), FieldState::Unknown);
//!
//! store.set(Volume(30), ChangeOrigin::Receiver);
//! assert_eq!(store.get::<Volume>(), FieldState::Known(Volume(30)));
//! ```

use serde::Serialize;

/// Value of a field that may not have been reported yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldState<T> {
    /// Nothing known since start-up or the last reconnect
    Unknown,
    Known(T),
}

impl<T> Default for FieldState<T> {
    fn default() -> Self {
        FieldState::Unknown
    }
}

impl<T> FieldState<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, FieldState::Known(_))
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            FieldState::Known(value) => Some(value),
            FieldState::Unknown => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldState<U> {
        match self {
            FieldState::Known(value) => FieldState::Known(f(value)),
            FieldState::Unknown => FieldState::Unknown,
        }
    }
}

impl<T: Copy + Default> FieldState<T> {
    /// The known value, or the type's default
    pub fn value_or_default(&self) -> T {
        self.known().copied().unwrap_or_default()
    }
}

/// The four tracked fields of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Power,
    Mute,
    Volume,
    Input,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Power, Field::Mute, Field::Volume, Field::Input];
}

/// A field value without its property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    Power(bool),
    Mute(bool),
    Volume(u8),
    Input(usize),
}

/// Zone power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Power(pub bool);

/// Zone mute state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Mute(pub bool);

/// Zone volume in receiver units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Volume(pub u8);

/// 1-based index into the zone's input table; 0 means none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActiveInput(pub usize);

/// All tracked fields of one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReceiverState {
    pub power: FieldState<Power>,
    pub mute: FieldState<Mute>,
    pub volume: FieldState<Volume>,
    pub input: FieldState<ActiveInput>,
}

/// A value stored in [`ReceiverState`]
///
/// `PartialEq` drives change detection: writing the current value again is
/// not a change.
pub trait Property: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Human-readable key for logs
    const KEY: &'static str;

    /// Which field this property occupies
    const FIELD: Field;

    fn into_value(self) -> FieldValue;

    fn slot(state: &mut ReceiverState) -> &mut FieldState<Self>;

    fn read(state: &ReceiverState) -> FieldState<Self>;
}

impl Property for Power {
    const KEY: &'static str = "power";
    const FIELD: Field = Field::Power;

    fn into_value(self) -> FieldValue {
        FieldValue::Power(self.0)
    }

    fn slot(state: &mut ReceiverState) -> &mut FieldState<Self> {
        &mut state.power
    }

    fn read(state: &ReceiverState) -> FieldState<Self> {
        state.power
    }
}

impl Property for Mute {
    const KEY: &'static str = "mute";
    const FIELD: Field = Field::Mute;

    fn into_value(self) -> FieldValue {
        FieldValue::Mute(self.0)
    }

    fn slot(state: &mut ReceiverState) -> &mut FieldState<Self> {
        &mut state.mute
    }

    fn read(state: &ReceiverState) -> FieldState<Self> {
        state.mute
    }
}

impl Property for Volume {
    const KEY: &'static str = "volume";
    const FIELD: Field = Field::Volume;

    fn into_value(self) -> FieldValue {
        FieldValue::Volume(self.0)
    }

    fn slot(state: &mut ReceiverState) -> &mut FieldState<Self> {
        &mut state.volume
    }

    fn read(state: &ReceiverState) -> FieldState<Self> {
        state.volume
    }
}

impl Property for ActiveInput {
    const KEY: &'static str = "input";
    const FIELD: Field = Field::Input;

    fn into_value(self) -> FieldValue {
        FieldValue::Input(self.0)
    }

    fn slot(state: &mut ReceiverState) -> &mut FieldState<Self> {
        &mut state.input
    }

    fn read(state: &ReceiverState) -> FieldState<Self> {
        state.input
    }
}
