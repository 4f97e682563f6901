//! Status decoder - converts receiver notifications to typed property changes

use onkyo_catalog::InputTable;
use onkyo_transport::{StatusNotification, StatusValue, StatusVerb};

use crate::error::{Result, StateError};
use crate::property::{ActiveInput, Mute, Power, Volume};

/// A single property change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyChange {
    Power(Power),
    Mute(Mute),
    Volume(Volume),
    Input(ActiveInput),
}

/// Decode a status notification into a property change
///
/// Returns `Ok(None)` for notifications that do not describe a tracked
/// field (other verbs, or values of an unexpected shape such as a mute
/// toggle echo). Input labels are looked up in `inputs`; the resulting
/// index is 1-based.
pub fn decode_status(
    status: &StatusNotification,
    inputs: &InputTable,
) -> Result<Option<PropertyChange>> {
    let change = match (&status.verb, &status.value) {
        (StatusVerb::Power, StatusValue::Bool(on)) => Some(PropertyChange::Power(Power(*on))),
        (StatusVerb::Mute, StatusValue::Bool(on)) => Some(PropertyChange::Mute(Mute(*on))),
        (StatusVerb::Volume, StatusValue::Level(level)) => {
            Some(PropertyChange::Volume(Volume(*level)))
        }
        (StatusVerb::Input, StatusValue::Label(label) | StatusValue::Raw(label)) => {
            let position = inputs
                .position_of_label(label)
                .ok_or_else(|| StateError::UnmappedInput {
                    label: label.clone(),
                })?;
            Some(PropertyChange::Input(ActiveInput(position + 1)))
        }
        _ => None,
    };

    Ok(change)
}
