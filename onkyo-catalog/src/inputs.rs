//! Per-model input tables
//!
//! A receiver only exposes the inputs its model family supports. The table
//! built here is the single source of truth for input indices: index `i`
//! (1-based) refers to `table.get(i)`, and index 0 means "no input known".

use crate::catalog::{strip_qualifier, Catalog};
use crate::error::InvalidInputIndexError;
use crate::zone::{Verb, Zone};

/// One selectable input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSource {
    /// 1-based position in the table
    pub index: usize,
    /// Normalized catalog token, e.g. `26`
    pub code: String,
    /// First alias of the catalog value, e.g. `video2`
    pub label: String,
}

/// Ordered inputs available on one receiver zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    inputs: Vec<InputSource>,
}

impl InputTable {
    /// Input at a 1-based index
    pub fn get(&self, index: usize) -> Result<&InputSource, InvalidInputIndexError> {
        index
            .checked_sub(1)
            .and_then(|position| self.inputs.get(position))
            .ok_or(InvalidInputIndexError {
                index,
                len: self.inputs.len(),
            })
    }

    /// 0-based position of a label
    ///
    /// Comparison ignores ASCII case and anything after the first comma, so
    /// an alias list reported by the receiver (`video2,cbl/sat`) matches the
    /// table label `video2`.
    pub fn position_of_label(&self, label: &str) -> Option<usize> {
        let wanted = strip_qualifier(label);
        self.inputs
            .iter()
            .position(|input| input.label.eq_ignore_ascii_case(wanted))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InputSource> {
        self.inputs.iter()
    }
}

impl<'a> IntoIterator for &'a InputTable {
    type Item = &'a InputSource;
    type IntoIter = std::slice::Iter<'a, InputSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.inputs.iter()
    }
}

/// Build the input table for a model in one zone
///
/// Entries of the zone's input selector command are kept in catalog order
/// when they are concrete values (no `UP`/`DOWN`/`QSTN` token), carry at
/// least one model family, and share a family with `model_id`. A label that
/// repeats an earlier one is dropped. An unknown model yields an empty table.
pub fn resolve_inputs(catalog: &Catalog, zone: Zone, model_id: &str) -> InputTable {
    let families = catalog.families_for_model(model_id);
    let verb = zone.verb(Verb::Input);

    let Some(command) = catalog.command_by_verb(zone, verb) else {
        tracing::warn!("Catalog has no {}.{} command, no inputs resolved", zone, verb);
        return InputTable::default();
    };

    let mut inputs: Vec<InputSource> = Vec::new();
    for entry in &command.entries {
        if entry.is_meta() || entry.models.is_empty() {
            continue;
        }
        if !entry.models.iter().any(|m| families.contains(&m.as_str())) {
            continue;
        }

        let label = entry.display_name();
        if inputs.iter().any(|input| input.label == label) {
            tracing::debug!("Skipping duplicate input label '{}' ({})", label, entry.token);
            continue;
        }

        inputs.push(InputSource {
            index: inputs.len() + 1,
            code: entry.normalized_token(),
            label: label.to_string(),
        });
    }

    tracing::debug!(
        "Resolved {} inputs for model '{}' in zone {} (families: {:?})",
        inputs.len(),
        model_id,
        zone,
        families
    );

    InputTable { inputs }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InputTable {
        let catalog = Catalog::load().unwrap();
        resolve_inputs(&catalog, Zone::Main, "TX-NR686")
    }

    #[test]
    fn test_get_bounds() {
        let table = table();
        assert!(table.get(0).is_err());
        assert_eq!(table.get(1).unwrap().label, "video1");
        assert!(table.get(table.len()).is_ok());

        let err = table.get(table.len() + 1).unwrap_err();
        assert_eq!(err.index, table.len() + 1);
        assert_eq!(err.len, table.len());
    }

    #[test]
    fn test_position_of_label_strips_qualifier() {
        let table = table();
        assert_eq!(table.position_of_label("video2,cbl/sat"), Some(1));
        assert_eq!(table.position_of_label("VIDEO2"), Some(1));
        assert_eq!(table.position_of_label("tape-1"), None);
    }

    #[test]
    fn test_family_filtering() {
        let catalog = Catalog::load().unwrap();

        let nr686 = resolve_inputs(&catalog, Zone::Main, "TX-NR686");
        let labels: Vec<_> = nr686.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"tv"));
        assert!(!labels.contains(&"tuner"));
        assert!(!labels.contains(&"hdmi-5"));
        // untagged entries never appear
        assert!(!labels.contains(&"airplay"));

        let nr474 = resolve_inputs(&catalog, Zone::Main, "TX-NR474");
        let labels: Vec<_> = nr474.iter().map(|i| (i.code.as_str(), i.label.as_str())).collect();
        assert_eq!(labels, vec![("20", "tape-1"), ("26", "tuner")]);
    }

    #[test]
    fn test_unknown_model_is_empty() {
        let catalog = Catalog::load().unwrap();
        let table = resolve_inputs(&catalog, Zone::Main, "DTR-99");
        assert!(table.is_empty());
        assert!(table.get(1).is_err());

        assert!(resolve_inputs(&catalog, Zone::Zone2, "").is_empty());
    }

    #[test]
    fn test_indices_are_sequential() {
        let table = table();
        for (position, input) in table.iter().enumerate() {
            assert_eq!(input.index, position + 1);
        }
    }
}
