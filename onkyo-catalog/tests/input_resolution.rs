//! Input resolution against bundled and hand-written catalogs

use std::io::Write;

use onkyo_catalog::{is_meta_token, resolve_inputs, Catalog, Zone};
use proptest::prelude::*;
use rstest::rstest;

const NR686_CATALOG: &str = r#"{
  "modelsets": { "NR686": ["TX-NR686"] },
  "commands": {
    "main": {
      "SLI": {
        "name": "input-selector",
        "values": {
          "01": { "name": "VCR/DVR", "models": "NR686" },
          "02": { "name": "CBL/SAT", "models": ["NR686"] },
          "UP": { "name": "up", "models": "NR686" },
          "QSTN": { "name": "query", "models": "NR686" }
        }
      }
    }
  }
}"#;

fn all_models() -> Vec<&'static str> {
    vec![
        "TX-NR686",
        "TX-NR787",
        "TX-RZ730",
        "TX-RZ830",
        "TX-NR575E",
        "TX-NR474",
        "TX-SR393",
        "TX-SR494",
        "TX-RZ50",
        "TX-RZ70",
        "TX-NR6100",
        "TX-NR5100",
    ]
}

#[test]
fn test_nr686_scenario() {
    let catalog = Catalog::from_json(NR686_CATALOG).unwrap();
    let table = resolve_inputs(&catalog, Zone::Main, "TX-NR686");

    let rows: Vec<_> = table
        .iter()
        .map(|i| (i.index, i.code.as_str(), i.label.as_str()))
        .collect();
    assert_eq!(rows, vec![(1, "01", "VCR/DVR"), (2, "02", "CBL/SAT")]);
}

#[test]
fn test_duplicate_labels_keep_first() {
    let json = r#"{
      "modelsets": { "fam": ["TX-1"] },
      "commands": { "main": { "SLI": { "name": "input-selector", "values": {
        "10": { "name": ["dvd", "bd/dvd"], "models": "fam" },
        "11": { "name": "dvd", "models": "fam" },
        "12": { "name": "tv", "models": "fam" }
      } } } }
    }"#;
    let catalog = Catalog::from_json(json).unwrap();
    let table = resolve_inputs(&catalog, Zone::Main, "TX-1");

    let codes: Vec<_> = table.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["10", "12"]);
    assert_eq!(table.get(2).unwrap().label, "tv");
}

#[test]
fn test_regional_suffix_matches_base_model() {
    let json = r#"{
      "modelsets": { "fam": ["TX-NR686(Ether)"] },
      "commands": { "main": { "SLI": { "name": "input-selector", "values": {
        "12": { "name": "tv", "models": "fam" }
      } } } }
    }"#;
    let catalog = Catalog::from_json(json).unwrap();
    assert_eq!(resolve_inputs(&catalog, Zone::Main, "TX-NR686").len(), 1);
}

#[test]
fn test_catalog_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(NR686_CATALOG.as_bytes()).unwrap();

    let catalog = Catalog::from_path(file.path()).unwrap();
    assert_eq!(resolve_inputs(&catalog, Zone::Main, "TX-NR686").len(), 2);

    assert!(Catalog::from_path("/nonexistent/eiscp-commands.json").is_err());
}

#[rstest]
#[case(Zone::Main, "TX-NR686", "tv")]
#[case(Zone::Main, "TX-RZ50", "hdmi-5")]
#[case(Zone::Main, "TX-RZ730", "source")]
#[case(Zone::Zone2, "TX-NR575E", "network")]
#[case(Zone::Zone2, "TX-RZ830", "bluetooth")]
fn test_model_has_input(#[case] zone: Zone, #[case] model: &str, #[case] label: &str) {
    let catalog = Catalog::load().unwrap();
    let table = resolve_inputs(&catalog, zone, model);
    assert!(
        table.position_of_label(label).is_some(),
        "{model} in {zone} should offer {label}"
    );
}

proptest! {
    #[test]
    fn prop_resolved_inputs_are_concrete_and_supported(
        model_index in 0usize..12,
        zone_index in 0usize..2,
    ) {
        let catalog = Catalog::load().unwrap();
        let model = all_models()[model_index];
        let zone = Zone::ALL[zone_index];
        let families = catalog.families_for_model(model);

        let table = resolve_inputs(&catalog, zone, model);

        for (position, input) in table.iter().enumerate() {
            prop_assert_eq!(input.index, position + 1);
            prop_assert!(!is_meta_token(&input.code));

            let code = match zone {
                Zone::Main => "SLI",
                Zone::Zone2 => "SLZ",
            };
            let entry = catalog.entry(zone, code, &input.code).unwrap();
            prop_assert!(entry.models.iter().any(|m| families.contains(&m.as_str())));
        }

        // catalog order is preserved
        let positions: Vec<_> = table
            .iter()
            .map(|input| {
                catalog
                    .entries()
                    .position(|e| e.zone == zone && e.normalized_token() == input.code
                        && e.verb == zone.verb(onkyo_catalog::Verb::Input))
                    .unwrap()
            })
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }
}
