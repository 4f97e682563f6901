//! Events emitted by the connection actor

use onkyo_catalog::{strip_qualifier, Decoded, DecodedValue, Verb, Zone};

use crate::error::TransportError;

/// Everything the transport reports about its connection
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A TCP connection to the receiver was established
    Connected { host: String, port: u16 },

    /// The connection ended
    Closed { reason: String },

    /// Protocol-level trace
    Debug(String),

    /// A connection-level failure
    Error(TransportError),

    /// A decoded status message from the receiver
    Status(StatusNotification),
}

/// Which tracked capability a status message reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusVerb {
    Power,
    Volume,
    Mute,
    Input,
    /// Any other command, by verb name
    Other(String),
}

impl From<Verb> for StatusVerb {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Power => StatusVerb::Power,
            Verb::Volume => StatusVerb::Volume,
            Verb::Mute => StatusVerb::Mute,
            Verb::Input => StatusVerb::Input,
        }
    }
}

/// Value carried by a status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    Bool(bool),
    Level(u8),
    /// A named value; aliases are joined with `,`
    Label(String),
    Raw(String),
}

/// A status message from the receiver in zone and verb terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub zone: Zone,
    pub verb: StatusVerb,
    pub value: StatusValue,
}

impl From<Decoded> for StatusNotification {
    fn from(decoded: Decoded) -> Self {
        let verb = decoded
            .zone
            .classify(&decoded.verb)
            .map(StatusVerb::from)
            .unwrap_or(StatusVerb::Other(decoded.verb));

        let value = match (&verb, decoded.value) {
            (StatusVerb::Power | StatusVerb::Mute, DecodedValue::Named(name)) => {
                match strip_qualifier(&name) {
                    "on" => StatusValue::Bool(true),
                    "off" | "standby" => StatusValue::Bool(false),
                    _ => StatusValue::Label(name),
                }
            }
            (_, DecodedValue::Level(level)) => StatusValue::Level(level),
            (_, DecodedValue::Named(name)) => StatusValue::Label(name),
            (_, DecodedValue::Raw(raw)) => StatusValue::Raw(raw),
        };

        Self {
            zone: decoded.zone,
            verb,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onkyo_catalog::Catalog;
    use rstest::rstest;

    #[rstest]
    #[case("PWR", "01", Zone::Main, StatusVerb::Power, StatusValue::Bool(true))]
    #[case("PWR", "00", Zone::Main, StatusVerb::Power, StatusValue::Bool(false))]
    #[case("ZMT", "01", Zone::Zone2, StatusVerb::Mute, StatusValue::Bool(true))]
    #[case("MVL", "2A", Zone::Main, StatusVerb::Volume, StatusValue::Level(42))]
    #[case("SLI", "01", Zone::Main, StatusVerb::Input, StatusValue::Label("video2,cbl/sat".into()))]
    #[case("NTC", "PLAY", Zone::Main, StatusVerb::Other("network-usb".into()), StatusValue::Label("play".into()))]
    #[case("SLI", "FF", Zone::Main, StatusVerb::Input, StatusValue::Raw("FF".into()))]
    fn test_status_from_decoded(
        #[case] code: &str,
        #[case] payload: &str,
        #[case] zone: Zone,
        #[case] verb: StatusVerb,
        #[case] value: StatusValue,
    ) {
        let catalog = Catalog::load().unwrap();
        let status = StatusNotification::from(catalog.decode(code, payload).unwrap());
        assert_eq!(status.zone, zone);
        assert_eq!(status.verb, verb);
        assert_eq!(status.value, value);
    }
}
