//! Reconciler behaviour against sequences of transport events

use std::sync::{mpsc, Arc};
use std::time::Duration;

use onkyo_catalog::{resolve_inputs, Catalog, InputTable, Zone};
use onkyo_state::{
    spawn_reconciler, ActiveInput, ChangeOrigin, Field, FieldState, FieldValue, Power,
    Reconciler, StateError, StateStore, Volume,
};
use onkyo_transport::{StatusNotification, StatusValue, StatusVerb, TransportEvent};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn inputs() -> Arc<InputTable> {
    Arc::new(resolve_inputs(&Catalog::load().unwrap(), Zone::Main, "TX-NR686"))
}

fn reconciler() -> Reconciler {
    Reconciler::new(Zone::Main, inputs(), StateStore::new())
}

fn status(zone: Zone, verb: StatusVerb, value: StatusValue) -> TransportEvent {
    TransportEvent::Status(StatusNotification { zone, verb, value })
}

fn power(on: bool) -> TransportEvent {
    status(Zone::Main, StatusVerb::Power, StatusValue::Bool(on))
}

fn connected() -> TransportEvent {
    TransportEvent::Connected {
        host: "127.0.0.1".to_string(),
        port: 60128,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_repeated_power_on_notifies_once() {
    let mut reconciler = reconciler();
    let changes = reconciler.store().subscribe();

    assert!(reconciler.apply(&power(true)).unwrap());
    assert!(!reconciler.apply(&power(true)).unwrap());

    let received: Vec<_> = changes.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].field, Field::Power);
    assert_eq!(received[0].origin, ChangeOrigin::Receiver);
    assert!(reconciler.store().snapshot().power);
}

#[test]
fn test_receiver_overrides_optimistic_write() {
    let mut reconciler = reconciler();
    reconciler.store().set(Volume(40), ChangeOrigin::Optimistic);

    reconciler
        .apply(&status(Zone::Main, StatusVerb::Volume, StatusValue::Level(35)))
        .unwrap();

    assert_eq!(reconciler.store().get::<Volume>(), FieldState::Known(Volume(35)));
}

#[test]
fn test_input_label_maps_to_one_based_index() {
    let mut reconciler = reconciler();

    reconciler
        .apply(&status(
            Zone::Main,
            StatusVerb::Input,
            StatusValue::Label("video2,cbl/sat".to_string()),
        ))
        .unwrap();

    assert_eq!(reconciler.store().snapshot().input, 2);
}

#[test]
fn test_unmapped_input_keeps_previous_index() {
    let mut reconciler = reconciler();
    reconciler.store().set(ActiveInput(3), ChangeOrigin::Receiver);
    let changes = reconciler.store().subscribe();

    let result = reconciler.apply(&status(
        Zone::Main,
        StatusVerb::Input,
        StatusValue::Label("tuner".to_string()),
    ));

    assert_eq!(
        result,
        Err(StateError::UnmappedInput {
            label: "tuner".to_string()
        })
    );
    assert_eq!(reconciler.store().snapshot().input, 3);
    assert!(changes.try_recv().is_none());
}

#[test]
fn test_other_zone_is_ignored() {
    let mut reconciler = reconciler();

    let changed = reconciler
        .apply(&status(Zone::Zone2, StatusVerb::Power, StatusValue::Bool(true)))
        .unwrap();

    assert!(!changed);
    assert_eq!(reconciler.store().get::<Power>(), FieldState::Unknown);
}

#[test]
fn test_reconnect_resets_to_unknown() {
    let mut reconciler = reconciler();

    // First connect does not reset
    reconciler.apply(&connected()).unwrap();
    reconciler.apply(&power(true)).unwrap();
    reconciler
        .apply(&status(Zone::Main, StatusVerb::Volume, StatusValue::Level(12)))
        .unwrap();
    let changes = reconciler.store().subscribe();

    reconciler
        .apply(&TransportEvent::Closed {
            reason: "connection closed by receiver".to_string(),
        })
        .unwrap();
    assert!(reconciler.store().snapshot().power);

    assert!(reconciler.apply(&connected()).unwrap());

    let state = reconciler.store().state();
    assert_eq!(state.power, FieldState::Unknown);
    assert_eq!(state.volume, FieldState::Unknown);

    let reset: Vec<_> = changes.try_iter().collect();
    assert_eq!(reset.len(), 2);
    assert!(reset.iter().all(|c| c.origin == ChangeOrigin::Reset));
}

#[test]
fn test_spawned_reconciler_applies_events() {
    let store = StateStore::new();
    let changes = store.subscribe();
    let (tx, rx) = mpsc::channel();

    let handle = spawn_reconciler(Reconciler::new(Zone::Main, inputs(), store.clone()), rx);

    tx.send(connected()).unwrap();
    tx.send(TransportEvent::Debug("received PWR01".to_string())).unwrap();
    tx.send(power(true)).unwrap();
    tx.send(status(Zone::Main, StatusVerb::Volume, StatusValue::Level(20)))
        .unwrap();

    let first = changes.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = changes.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first.value, FieldState::Known(FieldValue::Power(true)));
    assert_eq!(second.value, FieldState::Known(FieldValue::Volume(20)));

    // Closing the channel stops the worker
    drop(tx);
    handle.join().unwrap();
}

#[test]
fn test_snapshot_serializes() {
    let store = StateStore::new();
    store.set(Volume(30), ChangeOrigin::Receiver);

    let json = serde_json::to_value(store.snapshot()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "power": false, "mute": false, "volume": 30, "input": 0 })
    );
}

proptest! {
    /// Only value transitions produce notifications
    #[test]
    fn prop_notifications_match_transitions(levels in prop::collection::vec(0u8..4, 1..30)) {
        let mut reconciler = reconciler();
        let changes = reconciler.store().subscribe();

        let mut previous = None;
        let mut expected = 0;
        for level in &levels {
            if previous != Some(*level) {
                expected += 1;
            }
            previous = Some(*level);
            reconciler
                .apply(&status(Zone::Main, StatusVerb::Volume, StatusValue::Level(*level)))
                .unwrap();
        }

        prop_assert_eq!(changes.try_iter().count(), expected);
        prop_assert_eq!(reconciler.store().snapshot().volume, *levels.last().unwrap());
    }
}
