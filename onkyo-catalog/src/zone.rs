/// Independently controllable outputs of a receiver
///
/// Each zone has its own power, volume, mute and input state, addressed
/// through a zone-specific set of verb names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Main room output
    Main,
    /// Second room output
    Zone2,
}

/// The four tracked capabilities of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Power,
    Volume,
    Mute,
    Input,
}

/// Verb names used to build command strings for one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneVerbs {
    pub power: &'static str,
    pub volume: &'static str,
    pub mute: &'static str,
    pub input: &'static str,
}

const MAIN_VERBS: ZoneVerbs = ZoneVerbs {
    power: "system-power",
    volume: "master-volume",
    mute: "audio-muting",
    input: "input-selector",
};

const ZONE2_VERBS: ZoneVerbs = ZoneVerbs {
    power: "power",
    volume: "volume",
    mute: "muting",
    input: "selector",
};

impl Zone {
    /// All zones, in catalog order
    pub const ALL: [Zone; 2] = [Zone::Main, Zone::Zone2];

    /// Zone token as it appears in command strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Main => "main",
            Zone::Zone2 => "zone2",
        }
    }

    /// The verb table for this zone
    pub fn verbs(&self) -> ZoneVerbs {
        match self {
            Zone::Main => MAIN_VERBS,
            Zone::Zone2 => ZONE2_VERBS,
        }
    }

    /// Verb name for a capability in this zone
    pub fn verb(&self, verb: Verb) -> &'static str {
        let verbs = self.verbs();
        match verb {
            Verb::Power => verbs.power,
            Verb::Volume => verbs.volume,
            Verb::Mute => verbs.mute,
            Verb::Input => verbs.input,
        }
    }

    /// Which tracked capability a verb name refers to in this zone, if any
    pub fn classify(&self, verb_name: &str) -> Option<Verb> {
        [Verb::Power, Verb::Volume, Verb::Mute, Verb::Input]
            .into_iter()
            .find(|verb| self.verb(*verb) == verb_name)
    }
}

impl Verb {
    /// All tracked capabilities
    pub const ALL: [Verb; 4] = [Verb::Power, Verb::Volume, Verb::Mute, Verb::Input];
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Zone {
    type Err = crate::error::CatalogLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Zone::Main),
            "zone2" => Ok(Zone::Zone2),
            other => Err(crate::error::CatalogLoadError::UnknownZone(other.to_string())),
        }
    }
}
