//! Error types for onkyo-state

use thiserror::Error;

/// Result type for onkyo-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors raised while reconciling receiver reports
///
/// None of these are fatal; the previous state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The receiver reported an input that is not in the zone's input table
    #[error("Input '{label}' reported by the receiver is not in the input table")]
    UnmappedInput { label: String },
}
