//! Error types for the eISCP codec

use thiserror::Error;

/// Errors that can occur while framing or parsing eISCP packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Header declared a size outside 16..=64 bytes
    #[error("invalid header size {0}, expected 16 to 64")]
    InvalidHeaderSize(u32),

    /// Data size exceeds what a receiver ever sends
    #[error("packet data size {size} exceeds limit of {limit} bytes")]
    Oversized { size: u32, limit: u32 },

    /// Packet data did not start with the `!` start character and unit type
    #[error("missing ISCP start marker in {0:?}")]
    MissingStartMarker(String),

    /// Message body shorter than a 3-character command code
    #[error("ISCP message too short: {0:?}")]
    TooShort(String),

    /// Message body was not valid UTF-8
    #[error("ISCP message is not valid UTF-8")]
    InvalidEncoding,
}
