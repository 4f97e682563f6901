//! Zone-addressed command strings
//!
//! Commands are written as `<zone>.<verb>=<argument>` for absolute sets and
//! queries, or `<zone>.<verb>:<argument>` for relative steps and named
//! selections. The separator does not change the translation; it records
//! the caller's intent in logs and tests.

use std::fmt;
use std::str::FromStr;

use onkyo_catalog::Zone;
use thiserror::Error;

/// Which separator a command is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandForm {
    /// `zone.verb=argument`
    Absolute,
    /// `zone.verb:argument`
    Relative,
}

impl CommandForm {
    fn separator(&self) -> char {
        match self {
            CommandForm::Absolute => '=',
            CommandForm::Relative => ':',
        }
    }
}

/// A command addressed to one zone of a receiver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneCommand {
    pub zone: Zone,
    pub verb: String,
    pub argument: String,
    pub form: CommandForm,
    /// Catalog value token to send instead of resolving `argument`
    pub token: Option<String>,
}

impl ZoneCommand {
    /// `zone.verb=argument`
    pub fn absolute(zone: Zone, verb: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            zone,
            verb: verb.into(),
            argument: argument.into(),
            form: CommandForm::Absolute,
            token: None,
        }
    }

    /// `zone.verb:argument`
    pub fn relative(zone: Zone, verb: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            zone,
            verb: verb.into(),
            argument: argument.into(),
            form: CommandForm::Relative,
            token: None,
        }
    }

    /// `zone.verb=query`
    pub fn query(zone: Zone, verb: impl Into<String>) -> Self {
        Self::absolute(zone, verb, "query")
    }

    /// Pin the catalog value to send
    ///
    /// The argument stays as written for display; translation uses `token`,
    /// so aliases shared between values cannot pick the wrong one.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Display for ZoneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}{}",
            self.zone,
            self.verb,
            self.form.separator(),
            self.argument
        )
    }
}

/// A command string that does not follow `zone.verb=arg` / `zone.verb:arg`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed command string '{0}'")]
pub struct ParseCommandError(pub String);

impl FromStr for ZoneCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseCommandError(s.to_string());

        let (zone, rest) = s.split_once('.').ok_or_else(malformed)?;
        let zone: Zone = zone.parse().map_err(|_| malformed())?;

        let split_at = rest.find(['=', ':']).ok_or_else(malformed)?;
        let (verb, argument) = (&rest[..split_at], &rest[split_at + 1..]);
        if verb.is_empty() || argument.is_empty() {
            return Err(malformed());
        }

        let form = if rest[split_at..].starts_with('=') {
            CommandForm::Absolute
        } else {
            CommandForm::Relative
        };

        Ok(Self {
            zone,
            verb: verb.to_string(),
            argument: argument.to_string(),
            form,
            token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_display() {
        assert_eq!(
            ZoneCommand::absolute(Zone::Main, "system-power", "on").to_string(),
            "main.system-power=on"
        );
        assert_eq!(
            ZoneCommand::relative(Zone::Zone2, "volume", "level-up").to_string(),
            "zone2.volume:level-up"
        );
        assert_eq!(
            ZoneCommand::query(Zone::Main, "audio-muting").to_string(),
            "main.audio-muting=query"
        );
    }

    #[rstest]
    #[case("main.system-power=on", Zone::Main, "system-power", "on", CommandForm::Absolute)]
    #[case("main.input-selector:cbl/sat", Zone::Main, "input-selector", "cbl/sat", CommandForm::Relative)]
    #[case("zone2.volume=42", Zone::Zone2, "volume", "42", CommandForm::Absolute)]
    fn test_parse(
        #[case] input: &str,
        #[case] zone: Zone,
        #[case] verb: &str,
        #[case] argument: &str,
        #[case] form: CommandForm,
    ) {
        let command: ZoneCommand = input.parse().unwrap();
        assert_eq!(command.zone, zone);
        assert_eq!(command.verb, verb);
        assert_eq!(command.argument, argument);
        assert_eq!(command.form, form);
        assert_eq!(command.to_string(), input);
    }

    #[rstest]
    #[case("system-power=on")]
    #[case("zone3.power=on")]
    #[case("main.system-power")]
    #[case("main.=on")]
    #[case("main.system-power=")]
    fn test_parse_malformed(#[case] input: &str) {
        assert!(input.parse::<ZoneCommand>().is_err());
    }
}
