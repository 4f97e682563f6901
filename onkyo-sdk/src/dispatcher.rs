//! Zone command dispatcher
//!
//! Turns user intents into zone commands. Each intent is validated, written
//! to the state store optimistically, acknowledged immediately, and then
//! sent; if the receiver does not confirm it the optimistic field is
//! reverted.

use std::sync::Arc;

use onkyo_catalog::{Catalog, InputTable, Verb, Zone};
use onkyo_state::{ActiveInput, ChangeOrigin, Mute, Power, Property, StateStore, Volume};
use onkyo_transport::{CommandSink, ZoneCommand};

use crate::error::{DispatchError, UnsupportedRemoteKeyError};

/// Volume range used when the catalog does not declare one
const DEFAULT_VOLUME_RANGE: (u8, u8) = (0, 100);

/// Direction of a relative volume step
///
/// Discriminants follow the HomeKit `VolumeSelector` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeDirection {
    Increment = 0,
    Decrement = 1,
}

impl VolumeDirection {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VolumeDirection::Increment),
            1 => Some(VolumeDirection::Decrement),
            _ => None,
        }
    }

    fn argument(&self) -> &'static str {
        match self {
            VolumeDirection::Increment => "level-up",
            VolumeDirection::Decrement => "level-down",
        }
    }
}

/// Remote control keys
///
/// Discriminants follow the HomeKit `RemoteKey` identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    Rewind = 0,
    FastForward = 1,
    NextTrack = 2,
    PreviousTrack = 3,
    ArrowUp = 4,
    ArrowDown = 5,
    ArrowLeft = 6,
    ArrowRight = 7,
    Select = 8,
    Back = 9,
    Exit = 10,
    PlayPause = 11,
    Information = 15,
}

impl RemoteKey {
    pub const ALL: [RemoteKey; 13] = [
        RemoteKey::Rewind,
        RemoteKey::FastForward,
        RemoteKey::NextTrack,
        RemoteKey::PreviousTrack,
        RemoteKey::ArrowUp,
        RemoteKey::ArrowDown,
        RemoteKey::ArrowLeft,
        RemoteKey::ArrowRight,
        RemoteKey::Select,
        RemoteKey::Back,
        RemoteKey::Exit,
        RemoteKey::PlayPause,
        RemoteKey::Information,
    ];

    /// Look up a key by its HomeKit identifier
    pub fn from_code(code: u8) -> Result<Self, UnsupportedRemoteKeyError> {
        Self::ALL
            .into_iter()
            .find(|key| key.code() == code)
            .ok_or(UnsupportedRemoteKeyError { code })
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Main-zone command verb and argument that press this key
    pub fn command(&self) -> (&'static str, &'static str) {
        match self {
            RemoteKey::Rewind => ("network-usb", "rew"),
            RemoteKey::FastForward => ("network-usb", "ff"),
            RemoteKey::NextTrack => ("network-usb", "trup"),
            RemoteKey::PreviousTrack => ("network-usb", "trdn"),
            RemoteKey::ArrowUp => ("setup", "up"),
            RemoteKey::ArrowDown => ("setup", "down"),
            RemoteKey::ArrowLeft => ("setup", "left"),
            RemoteKey::ArrowRight => ("setup", "right"),
            RemoteKey::Select => ("setup", "enter"),
            RemoteKey::Back => ("setup", "exit"),
            RemoteKey::Exit => ("setup", "exit"),
            RemoteKey::PlayPause => ("network-usb", "play"),
            RemoteKey::Information => ("setup", "menu"),
        }
    }
}

impl TryFrom<u8> for RemoteKey {
    type Error = UnsupportedRemoteKeyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// Sends intents for one receiver zone
pub struct Dispatcher {
    zone: Zone,
    sink: Arc<dyn CommandSink>,
    store: StateStore,
    inputs: Arc<InputTable>,
    volume_range: (u8, u8),
}

impl Dispatcher {
    pub fn new(
        zone: Zone,
        sink: Arc<dyn CommandSink>,
        store: StateStore,
        inputs: Arc<InputTable>,
        catalog: &Catalog,
    ) -> Self {
        let volume_range = catalog
            .range(zone, zone.verb(Verb::Volume))
            .unwrap_or(DEFAULT_VOLUME_RANGE);

        Self {
            zone,
            sink,
            store,
            inputs,
            volume_range,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Inclusive volume bounds of this zone
    pub fn volume_range(&self) -> (u8, u8) {
        self.volume_range
    }

    pub fn set_power(&self, on: bool) -> Result<(), DispatchError> {
        self.store.set(Power(on), ChangeOrigin::Optimistic);

        let argument = if on { "on" } else { "standby" };
        self.send_reverting::<Power>(ZoneCommand::absolute(
            self.zone,
            self.zone.verb(Verb::Power),
            argument,
        ));
        Ok(())
    }

    pub fn set_mute(&self, on: bool) -> Result<(), DispatchError> {
        self.store.set(Mute(on), ChangeOrigin::Optimistic);

        let argument = if on { "on" } else { "off" };
        self.send_reverting::<Mute>(ZoneCommand::absolute(
            self.zone,
            self.zone.verb(Verb::Mute),
            argument,
        ));
        Ok(())
    }

    pub fn set_volume_absolute(&self, level: u8) -> Result<(), DispatchError> {
        let (min, max) = self.volume_range;
        if level < min || level > max {
            return Err(DispatchError::VolumeOutOfRange { level, min, max });
        }

        self.store.set(Volume(level), ChangeOrigin::Optimistic);
        self.send_reverting::<Volume>(ZoneCommand::absolute(
            self.zone,
            self.zone.verb(Verb::Volume),
            level.to_string(),
        ));
        Ok(())
    }

    /// Step the volume by one unit
    ///
    /// The optimistic value starts from 0 when the volume is unknown and
    /// stays within the zone's range.
    pub fn set_volume_relative(&self, direction: VolumeDirection) -> Result<(), DispatchError> {
        let (min, max) = self.volume_range;
        self.store.update::<Volume>(
            |current| {
                let level = current.value_or_default().0;
                let next = match direction {
                    VolumeDirection::Increment => level.saturating_add(1),
                    VolumeDirection::Decrement => level.saturating_sub(1),
                };
                Volume(next.clamp(min, max))
            },
            ChangeOrigin::Optimistic,
        );

        self.send_reverting::<Volume>(ZoneCommand::relative(
            self.zone,
            self.zone.verb(Verb::Volume),
            direction.argument(),
        ));
        Ok(())
    }

    /// Select an input by its 1-based index in the input table
    pub fn set_input(&self, index: usize) -> Result<(), DispatchError> {
        let input = self.inputs.get(index)?;

        self.store.set(ActiveInput(index), ChangeOrigin::Optimistic);
        self.send_reverting::<ActiveInput>(
            ZoneCommand::relative(self.zone, self.zone.verb(Verb::Input), input.label.clone())
                .with_token(input.code.clone()),
        );
        Ok(())
    }

    /// Press a remote key; keys always address the main zone
    pub fn press_remote_key(&self, key: RemoteKey) -> Result<(), DispatchError> {
        let (verb, argument) = key.command();
        let command = ZoneCommand::relative(Zone::Main, verb, argument);

        tracing::debug!("Pressing {:?} as {}", key, command);
        let description = command.to_string();
        self.sink.send(
            command,
            Box::new(move |result| {
                if let Err(e) = result {
                    tracing::warn!("Remote key {} failed: {}", description, e);
                }
            }),
        );
        Ok(())
    }

    /// Send a command whose failure reverts property `P` to its default
    fn send_reverting<P: Property>(&self, command: ZoneCommand) {
        tracing::debug!("Sending {}", command);

        let store = self.store.clone();
        let description = command.to_string();
        self.sink.send(
            command,
            Box::new(move |result| {
                if let Err(e) = result {
                    tracing::warn!(
                        "Command {} failed: {}; reverting {}",
                        description,
                        e,
                        P::KEY
                    );
                    store.set(P::default(), ChangeOrigin::Revert);
                }
            }),
        );
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("zone", &self.zone)
            .field("inputs", &self.inputs.len())
            .field("volume_range", &self.volume_range)
            .finish()
    }
}
