//! Change notifications for receiver state
//!
//! Every mutation of a tracked field produces one `StateChange` carrying the
//! new value and where it came from, so observers can tell an optimistic
//! write from a receiver report or a revert.

use std::time::Instant;

use serde::Serialize;

use crate::property::{Field, FieldState, FieldValue};

/// What caused a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    /// Status reported by the receiver
    Receiver,
    /// Written ahead of a command's reply
    Optimistic,
    /// A failed command rolled its optimistic write back
    Revert,
    /// Cleared after a reconnect
    Reset,
}

/// A change to one field
#[derive(Debug, Clone)]
pub struct StateChange {
    /// The field that changed
    pub field: Field,

    /// Its new value
    pub value: FieldState<FieldValue>,

    pub origin: ChangeOrigin,

    /// When the change was applied
    pub timestamp: Instant,
}

impl StateChange {
    /// Create a new change event
    pub fn new(field: Field, value: FieldState<FieldValue>, origin: ChangeOrigin) -> Self {
        Self {
            field,
            value,
            origin,
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for StateChange {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.field == other.field && self.value == other.value && self.origin == other.origin
    }
}
