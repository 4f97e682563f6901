use std::path::PathBuf;

use thiserror::Error;

use crate::zone::Zone;

/// Errors raised while loading the command database
///
/// These are fatal at start-up: no device can be initialized without a
/// catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The database file could not be read
    #[error("Failed to read command catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database is not valid JSON or does not match the schema
    #[error("Malformed command catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// A zone key other than `main` or `zone2`
    #[error("Unknown zone '{0}' in command catalog")]
    UnknownZone(String),

    /// A command without a verb name
    #[error("Command {code} in zone {zone} has no name")]
    MissingName { zone: Zone, code: String },

    /// Two commands share a verb name within one zone
    #[error("Verb '{verb}' is defined twice in zone {zone}")]
    DuplicateVerb { zone: Zone, verb: String },

    /// A command code that is not exactly three characters
    #[error("Invalid command code '{0}', expected three characters")]
    InvalidCode(String),
}

/// Errors translating between command strings and ISCP messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown verb '{verb}' for zone {zone}")]
    UnknownVerb { zone: Zone, verb: String },

    #[error("Unknown value '{value}' for {zone}.{verb}")]
    UnknownValue {
        zone: Zone,
        verb: String,
        value: String,
    },

    #[error("Value {value} for {zone}.{verb} is out of range [{min}, {max}]")]
    OutOfRange {
        zone: Zone,
        verb: String,
        value: i64,
        min: u8,
        max: u8,
    },

    #[error("Unknown command code '{0}'")]
    UnknownCode(String),
}

/// An input index outside the resolved input table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid input index {index}, valid range is 1..={len}")]
pub struct InvalidInputIndexError {
    pub index: usize,
    pub len: usize,
}

/// Type alias for catalog loading results
pub type Result<T> = std::result::Result<T, CatalogLoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::OutOfRange {
            zone: Zone::Main,
            verb: "master-volume".to_string(),
            value: 120,
            min: 0,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "Value 120 for main.master-volume is out of range [0, 100]"
        );

        let err = InvalidInputIndexError { index: 0, len: 3 };
        assert_eq!(err.to_string(), "Invalid input index 0, valid range is 1..=3");
    }
}
