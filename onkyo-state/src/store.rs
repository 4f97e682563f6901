//! Shared receiver state with change detection
//!
//! The store holds the four tracked fields of one receiver zone. It is
//! written by the reconciler (receiver reports, reconnect resets) and by the
//! dispatcher (optimistic writes and reverts); every actual change is
//! delivered to all subscribers.

use std::sync::{mpsc, Arc, Mutex, RwLock};

use serde::Serialize;

use crate::event::{ChangeOrigin, StateChange};
use crate::iter::ChangeIterator;
use crate::property::{ActiveInput, FieldState, Mute, Power, Property, ReceiverState, Volume};

/// Plain view of a zone's state
///
/// Unknown fields read as `false`, `false`, `0` and `0` (no input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReceiverSnapshot {
    pub power: bool,
    pub mute: bool,
    pub volume: u8,
    pub input: usize,
}

impl From<&ReceiverState> for ReceiverSnapshot {
    fn from(state: &ReceiverState) -> Self {
        Self {
            power: state.power.value_or_default().0,
            mute: state.mute.value_or_default().0,
            volume: state.volume.value_or_default().0,
            input: state.input.value_or_default().0,
        }
    }
}

/// Thread-safe state of one receiver zone
///
/// Clones share the same state and subscribers.
///
/// # Example
///
/// ```rust
/// use onkyo_state::{ChangeOrigin, Power, StateStore};
///
/// let store = StateStore::new();
/// let changes = store.subscribe();
///
/// assert!(store.set(Power(true), ChangeOrigin::Receiver));
/// // Same value again is not a change
/// assert!(!store.set(Power(true), ChangeOrigin::Receiver));
///
/// assert_eq!(changes.try_iter().count(), 1);
/// assert!(store.snapshot().power);
/// ```
#[derive(Clone, Default)]
pub struct StateStore {
    state: Arc<RwLock<ReceiverState>>,
    subscribers: Arc<Mutex<Vec<mpsc::Sender<StateChange>>>>,
}

impl StateStore {
    /// Create a store with every field unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of one field
    pub fn get<P: Property>(&self) -> FieldState<P> {
        self.state
            .read()
            .map(|state| P::read(&state))
            .unwrap_or_default()
    }

    /// Set a field, returning whether the value changed
    pub fn set<P: Property>(&self, value: P, origin: ChangeOrigin) -> bool {
        self.replace(FieldState::Known(value), origin)
    }

    /// Mark a field unknown, returning whether it was known
    pub fn forget<P: Property>(&self, origin: ChangeOrigin) -> bool {
        self.replace::<P>(FieldState::Unknown, origin)
    }

    /// Compute a field's new value from its current state, atomically
    ///
    /// Returns the value written.
    pub fn update<P: Property>(
        &self,
        f: impl FnOnce(FieldState<P>) -> P,
        origin: ChangeOrigin,
    ) -> P {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(_) => return f(FieldState::Unknown),
        };
        let slot = P::slot(&mut state);
        let value = f(*slot);
        if *slot != FieldState::Known(value) {
            *slot = FieldState::Known(value);
            // Notified under the write lock so observers see writes in store order
            self.notify::<P>(FieldState::Known(value), origin);
        }

        value
    }

    /// Mark every field unknown, returning how many were known
    pub fn reset(&self, origin: ChangeOrigin) -> usize {
        [
            self.forget::<Power>(origin),
            self.forget::<Mute>(origin),
            self.forget::<Volume>(origin),
            self.forget::<ActiveInput>(origin),
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }

    /// All fields with their known/unknown status
    pub fn state(&self) -> ReceiverState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or_default()
    }

    /// Plain values, with defaults for unknown fields
    pub fn snapshot(&self) -> ReceiverSnapshot {
        ReceiverSnapshot::from(&self.state())
    }

    /// Receive every future change
    pub fn subscribe(&self) -> ChangeIterator {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        ChangeIterator::new(rx)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn replace<P: Property>(&self, next: FieldState<P>, origin: ChangeOrigin) -> bool {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(_) => return false,
        };
        let slot = P::slot(&mut state);
        if *slot == next {
            return false;
        }

        *slot = next;
        self.notify::<P>(next, origin);
        true
    }

    /// Called with the state write lock held
    fn notify<P: Property>(&self, value: FieldState<P>, origin: ChangeOrigin) {
        tracing::info!("{} changed to {:?} ({:?})", P::KEY, value, origin);

        let change = StateChange::new(P::FIELD, value.map(P::into_value), origin);
        if let Ok(mut subscribers) = self.subscribers.lock() {
            // Dropped iterators are pruned here
            subscribers.retain(|tx| tx.send(change.clone()).is_ok());
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
