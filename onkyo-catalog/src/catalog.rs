//! The static eISCP command database
//!
//! The catalog maps each zone's command verbs (`system-power`,
//! `input-selector`, ...) to their three-letter ISCP codes and lists every
//! value a command accepts, tagged with the model families that support it.
//! It is loaded once and shared read-only across all devices.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CatalogError, CatalogLoadError, Result};
use crate::zone::Zone;

/// Command database compiled into the crate
const BUNDLED_CATALOG: &str = include_str!("../data/eiscp-commands.json");

/// Markers of tokens that are operations rather than concrete values
const META_MARKERS: [&str; 3] = ["UP", "DOWN", "QSTN"];

// ============================================================================
// On-disk schema
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    modelsets: IndexMap<String, Vec<String>>,
    commands: IndexMap<String, IndexMap<String, RawCommand>>,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    #[serde(default)]
    name: String,
    description: Option<String>,
    range: Option<[u8; 2]>,
    #[serde(default)]
    values: IndexMap<String, RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    name: OneOrMany,
    description: Option<String>,
    models: Option<OneOrMany>,
}

// ============================================================================
// Public model
// ============================================================================

/// One value of one command, e.g. `SLI` / `01` / `video2,cbl/sat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Zone the owning command belongs to
    pub zone: Zone,
    /// Three-letter ISCP code of the owning command
    pub command: String,
    /// Verb name of the owning command
    pub verb: String,
    /// Value token exactly as stored in the database
    pub token: String,
    /// Value name; multiple aliases are joined with `,`
    pub name: String,
    pub description: Option<String>,
    /// Model families this value applies to
    pub models: Vec<String>,
}

impl CatalogEntry {
    /// The first alias, as shown to users
    pub fn display_name(&self) -> &str {
        strip_qualifier(&self.name)
    }

    /// All aliases of this value
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.name.split(',').map(str::trim)
    }

    /// Whether any alias matches, ignoring ASCII case
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases().any(|a| a.eq_ignore_ascii_case(alias))
    }

    /// Token with curly-quote artifacts removed
    pub fn normalized_token(&self) -> String {
        normalize_token(&self.token)
    }

    /// True for increment/decrement/query tokens
    pub fn is_meta(&self) -> bool {
        is_meta_token(&self.normalized_token())
    }

    /// Whether this value is tagged with the given model family
    pub fn applies_to(&self, family: &str) -> bool {
        self.models.iter().any(|m| m == family)
    }
}

/// A command and all of its values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub zone: Zone,
    /// Three-letter ISCP code, e.g. `MVL`
    pub code: String,
    /// Verb name, e.g. `master-volume`
    pub verb: String,
    pub description: Option<String>,
    /// Inclusive numeric range for level arguments, sent as hex
    pub range: Option<(u8, u8)>,
    pub entries: Vec<CatalogEntry>,
}

/// A receiver message translated back into command terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub zone: Zone,
    pub verb: String,
    pub value: DecodedValue,
}

/// Value part of a decoded receiver message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// A catalog value; aliases joined with `,`
    Named(String),
    /// A numeric level of a ranged command
    Level(u8),
    /// Anything the catalog does not describe
    Raw(String),
}

/// The loaded command database
#[derive(Debug, Clone)]
pub struct Catalog {
    modelsets: IndexMap<String, Vec<String>>,
    commands: Vec<CommandDef>,
}

impl Catalog {
    /// Load the database bundled with this crate
    pub fn load() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load a database from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load a database from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let mut commands = Vec::new();

        for (zone_key, zone_commands) in raw.commands {
            let zone: Zone = zone_key.parse()?;

            for (code, command) in zone_commands {
                if code.chars().count() != 3 {
                    return Err(CatalogLoadError::InvalidCode(code));
                }
                if command.name.is_empty() {
                    return Err(CatalogLoadError::MissingName { zone, code });
                }
                if commands
                    .iter()
                    .any(|c: &CommandDef| c.zone == zone && c.verb == command.name)
                {
                    return Err(CatalogLoadError::DuplicateVerb {
                        zone,
                        verb: command.name,
                    });
                }

                let entries = command
                    .values
                    .into_iter()
                    .map(|(token, value)| CatalogEntry {
                        zone,
                        command: code.clone(),
                        verb: command.name.clone(),
                        token,
                        name: value.name.into_vec().join(","),
                        description: value.description,
                        models: value.models.map(OneOrMany::into_vec).unwrap_or_default(),
                    })
                    .collect();

                commands.push(CommandDef {
                    zone,
                    code,
                    verb: command.name,
                    description: command.description,
                    range: command.range.map(|[min, max]| (min, max)),
                    entries,
                });
            }
        }

        tracing::debug!(
            "Loaded command catalog: {} commands, {} model families",
            commands.len(),
            raw.modelsets.len()
        );

        Ok(Self {
            modelsets: raw.modelsets,
            commands,
        })
    }

    /// All commands in catalog order
    pub fn commands(&self) -> &[CommandDef] {
        &self.commands
    }

    /// All entries of all commands in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.commands.iter().flat_map(|c| c.entries.iter())
    }

    /// Look up a command by its verb name within a zone
    pub fn command_by_verb(&self, zone: Zone, verb: &str) -> Option<&CommandDef> {
        self.commands
            .iter()
            .find(|c| c.zone == zone && c.verb == verb)
    }

    /// Look up a command by its ISCP code
    pub fn command_by_code(&self, code: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.code == code)
    }

    /// Look up a single entry by raw token
    ///
    /// Tokens are compared after curly-quote normalization on both sides.
    pub fn entry(&self, zone: Zone, code: &str, token: &str) -> Option<&CatalogEntry> {
        let token = normalize_token(token);
        self.command_by_code(code)
            .filter(|c| c.zone == zone)?
            .entries
            .iter()
            .find(|e| e.normalized_token() == token)
    }

    /// Model families whose member list contains `model`
    ///
    /// Members are matched by substring so regional variants such as
    /// `TX-NR686(Ether)` count as the base model.
    pub fn families_for_model(&self, model: &str) -> Vec<&str> {
        if model.is_empty() {
            return Vec::new();
        }
        self.modelsets
            .iter()
            .filter(|(_, members)| members.iter().any(|member| member.contains(model)))
            .map(|(family, _)| family.as_str())
            .collect()
    }

    /// Entries tagged with a model family
    pub fn entries_for_family<'a>(
        &'a self,
        family: &'a str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries().filter(move |e| e.applies_to(family))
    }

    /// Numeric range of a zone's verb, if it takes levels
    pub fn range(&self, zone: Zone, verb: &str) -> Option<(u8, u8)> {
        self.command_by_verb(zone, verb)?.range
    }

    /// Translate `zone.verb` plus argument into an ISCP message body
    ///
    /// Named arguments are matched against value aliases; numeric arguments
    /// of ranged commands are sent as two-digit uppercase hex.
    pub fn encode(
        &self,
        zone: Zone,
        verb: &str,
        argument: &str,
    ) -> std::result::Result<String, CatalogError> {
        let command = self
            .command_by_verb(zone, verb)
            .ok_or_else(|| CatalogError::UnknownVerb {
                zone,
                verb: verb.to_string(),
            })?;

        if let Some(entry) = command.entries.iter().find(|e| e.has_alias(argument)) {
            return Ok(format!("{}{}", command.code, entry.normalized_token()));
        }

        if let (Some((min, max)), Ok(level)) = (command.range, argument.parse::<i64>()) {
            if level < i64::from(min) || level > i64::from(max) {
                return Err(CatalogError::OutOfRange {
                    zone,
                    verb: verb.to_string(),
                    value: level,
                    min,
                    max,
                });
            }
            return Ok(format!("{}{:02X}", command.code, level));
        }

        Err(CatalogError::UnknownValue {
            zone,
            verb: verb.to_string(),
            value: argument.to_string(),
        })
    }

    /// Translate `zone.verb` plus an exact value token, e.g. `01`
    pub fn encode_token(
        &self,
        zone: Zone,
        verb: &str,
        token: &str,
    ) -> std::result::Result<String, CatalogError> {
        let command = self
            .command_by_verb(zone, verb)
            .ok_or_else(|| CatalogError::UnknownVerb {
                zone,
                verb: verb.to_string(),
            })?;

        let token = normalize_token(token);
        command
            .entries
            .iter()
            .find(|e| e.normalized_token() == token)
            .map(|e| format!("{}{}", command.code, e.normalized_token()))
            .ok_or_else(|| CatalogError::UnknownValue {
                zone,
                verb: verb.to_string(),
                value: token,
            })
    }

    /// Translate a receiver message (`code` + `payload`) back into command terms
    pub fn decode(&self, code: &str, payload: &str) -> std::result::Result<Decoded, CatalogError> {
        let command = self
            .command_by_code(code)
            .ok_or_else(|| CatalogError::UnknownCode(code.to_string()))?;

        let value = if let Some(entry) = command
            .entries
            .iter()
            .find(|e| e.normalized_token() == payload)
        {
            DecodedValue::Named(entry.name.clone())
        } else if let Some(level) = command.range.and_then(|(min, max)| {
            u8::from_str_radix(payload, 16)
                .ok()
                .filter(|level| (min..=max).contains(level))
        }) {
            DecodedValue::Level(level)
        } else {
            DecodedValue::Raw(payload.to_string())
        };

        Ok(Decoded {
            zone: command.zone,
            verb: command.verb.clone(),
            value,
        })
    }
}

/// Remove curly-quote artifacts (`“26”` -> `26`) from a token
pub fn normalize_token(token: &str) -> String {
    token.replace(['\u{201c}', '\u{201d}'], "")
}

/// Everything before the first comma, trimmed
pub fn strip_qualifier(label: &str) -> &str {
    label.split(',').next().unwrap_or(label).trim()
}

/// True for tokens that denote increment, decrement or query operations
pub fn is_meta_token(token: &str) -> bool {
    META_MARKERS.iter().any(|marker| token.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::load().unwrap();
        assert!(catalog.command_by_verb(Zone::Main, "system-power").is_some());
        assert!(catalog.command_by_verb(Zone::Zone2, "selector").is_some());
        assert_eq!(catalog.range(Zone::Main, "master-volume"), Some((0, 100)));
    }

    #[test]
    fn test_every_zone_verb_is_in_bundled_catalog() {
        let catalog = Catalog::load().unwrap();
        for zone in Zone::ALL {
            for verb in crate::Verb::ALL {
                let name = zone.verb(verb);
                assert!(
                    catalog.command_by_verb(zone, name).is_some(),
                    "{zone}.{name} missing from catalog"
                );
            }
        }
    }

    #[test]
    fn test_encode_named_and_level() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.encode(Zone::Main, "system-power", "on").unwrap(), "PWR01");
        assert_eq!(catalog.encode(Zone::Main, "system-power", "standby").unwrap(), "PWR00");
        assert_eq!(catalog.encode(Zone::Main, "master-volume", "42").unwrap(), "MVL2A");
        assert_eq!(catalog.encode(Zone::Main, "master-volume", "level-up").unwrap(), "MVLUP");
        assert_eq!(catalog.encode(Zone::Zone2, "muting", "on").unwrap(), "ZMT01");
        assert_eq!(catalog.encode(Zone::Main, "input-selector", "CBL/SAT").unwrap(), "SLI01");
    }

    #[test]
    fn test_encode_normalizes_curly_tokens() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.encode(Zone::Main, "input-selector", "tuner").unwrap(), "SLI26");
    }

    #[test]
    fn test_encode_errors() {
        let catalog = Catalog::load().unwrap();
        assert!(matches!(
            catalog.encode(Zone::Main, "master-volume", "101"),
            Err(CatalogError::OutOfRange { value: 101, .. })
        ));
        assert!(matches!(
            catalog.encode(Zone::Main, "selector", "tv"),
            Err(CatalogError::UnknownVerb { .. })
        ));
        assert!(matches!(
            catalog.encode(Zone::Main, "system-power", "sideways"),
            Err(CatalogError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_decode() {
        let catalog = Catalog::load().unwrap();

        let decoded = catalog.decode("PWR", "01").unwrap();
        assert_eq!(decoded.zone, Zone::Main);
        assert_eq!(decoded.verb, "system-power");
        assert_eq!(decoded.value, DecodedValue::Named("on".to_string()));

        let decoded = catalog.decode("MVL", "2A").unwrap();
        assert_eq!(decoded.value, DecodedValue::Level(42));

        let decoded = catalog.decode("SLZ", "01").unwrap();
        assert_eq!(decoded.zone, Zone::Zone2);
        assert_eq!(decoded.value, DecodedValue::Named("video2,cbl/sat".to_string()));

        let decoded = catalog.decode("SLI", "26").unwrap();
        assert_eq!(decoded.value, DecodedValue::Named("tuner".to_string()));

        assert!(matches!(
            catalog.decode("XYZ", "00"),
            Err(CatalogError::UnknownCode(_))
        ));
    }

    #[test]
    fn test_decode_level_outside_range_is_raw() {
        let catalog = Catalog::load().unwrap();

        assert_eq!(
            catalog.decode("MVL", "64").unwrap().value,
            DecodedValue::Level(100)
        );
        assert_eq!(
            catalog.decode("MVL", "FF").unwrap().value,
            DecodedValue::Raw("FF".to_string())
        );
        assert_eq!(
            catalog.decode("ZVL", "65").unwrap().value,
            DecodedValue::Raw("65".to_string())
        );
    }

    #[test]
    fn test_encode_token() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.encode_token(Zone::Main, "input-selector", "01").unwrap(), "SLI01");
        assert_eq!(catalog.encode_token(Zone::Main, "input-selector", "“26”").unwrap(), "SLI26");
        assert!(matches!(
            catalog.encode_token(Zone::Main, "input-selector", "cbl/sat"),
            Err(CatalogError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_families_for_model_substring() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.families_for_model("TX-NR686"), vec!["set1", "set3"]);
        assert!(catalog.families_for_model("").is_empty());
        assert!(catalog.families_for_model("DTR-99").is_empty());
    }

    #[test]
    fn test_entry_lookup_by_token() {
        let catalog = Catalog::load().unwrap();
        let entry = catalog.entry(Zone::Main, "SLI", "“26”").unwrap();
        assert_eq!(entry.display_name(), "tuner");
        assert!(catalog.entry(Zone::Zone2, "SLI", "26").is_none());
    }

    #[test]
    fn test_invalid_catalogs() {
        assert!(matches!(
            Catalog::from_json("{ not json"),
            Err(CatalogLoadError::Json(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"commands": {"zone9": {}}}"#),
            Err(CatalogLoadError::UnknownZone(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"commands": {"main": {"PWRX": {"name": "p"}}}}"#),
            Err(CatalogLoadError::InvalidCode(_))
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"commands": {"main": {"PWR": {}}}}"#),
            Err(CatalogLoadError::MissingName { .. })
        ));
        assert!(matches!(
            Catalog::from_json(
                r#"{"commands": {"main": {"PWR": {"name": "p"}, "ZPW": {"name": "p"}}}}"#
            ),
            Err(CatalogLoadError::DuplicateVerb { .. })
        ));
    }

    #[test]
    fn test_token_helpers() {
        assert_eq!(normalize_token("“26”"), "26");
        assert_eq!(strip_qualifier("video2, cbl/sat"), "video2");
        assert_eq!(strip_qualifier("tv"), "tv");
        assert!(is_meta_token("QSTN"));
        assert!(is_meta_token("DOWN1"));
        assert!(!is_meta_token("2B"));
    }
}
