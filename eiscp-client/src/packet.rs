//! eISCP packet layout and ISCP message type

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Packet magic at the start of every eISCP header
pub const MAGIC: &[u8; 4] = b"ISCP";

/// Fixed header length written by receivers and by [`encode`]
pub const HEADER_SIZE: u32 = 16;

/// Largest header we skip over; receivers always send 16 bytes
pub const MAX_HEADER_SIZE: u32 = 64;

/// Upper bound on the data section we accept from the network
pub const MAX_DATA_SIZE: u32 = 64 * 1024;

/// TCP port receivers listen on for eISCP
pub const DEFAULT_PORT: u16 = 60128;

const VERSION: u8 = 0x01;

/// Unit type `1` addresses receivers
const START: &str = "!1";

/// A single ISCP message such as `PWR01` or `SLIQSTN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IscpMessage {
    body: String,
}

impl IscpMessage {
    /// Wrap a message body (`PWR01`); fails if shorter than a command code
    pub fn new(body: impl Into<String>) -> Result<Self, FrameError> {
        let body = body.into();
        if body.len() < 3 || !body.is_char_boundary(3) {
            return Err(FrameError::TooShort(body));
        }
        Ok(Self { body })
    }

    /// Three-character command code, e.g. `PWR`
    pub fn code(&self) -> &str {
        &self.body[..3]
    }

    /// Everything after the command code, e.g. `01`
    pub fn payload(&self) -> &str {
        &self.body[3..]
    }

    /// The full message body
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Parse the data section of a packet: `!1PWR01<EOF><CR><LF>`
    pub(crate) fn from_data(data: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(data).map_err(|_| FrameError::InvalidEncoding)?;
        let trimmed = text.trim_end_matches(['\u{1a}', '\r', '\n']);

        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some('!'), Some(_unit)) => {}
            _ => return Err(FrameError::MissingStartMarker(trimmed.to_string())),
        }

        Self::new(chars.as_str())
    }
}

impl fmt::Display for IscpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Build an eISCP packet for an ISCP message body
///
/// The body is the bare message (`PWR01`); start marker, unit type and the
/// terminating carriage return are added here.
pub fn encode(message: &str) -> Bytes {
    let data_len = START.len() + message.len() + 1;
    let mut buf = BytesMut::with_capacity(HEADER_SIZE as usize + data_len);

    buf.put_slice(MAGIC);
    buf.put_u32(HEADER_SIZE);
    buf.put_u32(data_len as u32);
    buf.put_u8(VERSION);
    buf.put_slice(&[0, 0, 0]);
    buf.put_slice(START.as_bytes());
    buf.put_slice(message.as_bytes());
    buf.put_u8(b'\r');

    buf.freeze()
}
