//! Streaming decoder for eISCP packets
//!
//! TCP reads do not line up with packet boundaries, so bytes are buffered
//! until a whole packet is available. Garbage in front of a packet magic is
//! discarded.

use bytes::{Buf, BytesMut};

use crate::error::FrameError;
use crate::packet::{IscpMessage, HEADER_SIZE, MAGIC, MAX_DATA_SIZE, MAX_HEADER_SIZE};

/// Incremental eISCP packet decoder
///
/// # Example
///
/// ```rust
/// use eiscp_client::{encode, FrameDecoder};
///
/// let packet = encode("AMT01");
/// let mut decoder = FrameDecoder::new();
///
/// // Half a packet is not enough
/// decoder.push(&packet[..10]);
/// assert!(decoder.next_frame().unwrap().is_none());
///
/// decoder.push(&packet[10..]);
/// assert_eq!(decoder.next_frame().unwrap().unwrap().as_str(), "AMT01");
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the connection
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet consumed
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop everything buffered, e.g. after a reconnect
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Decode the next complete packet
    ///
    /// Returns `Ok(None)` when more bytes are needed. A malformed packet is
    /// consumed and reported as an error; calling again continues with the
    /// bytes that follow it.
    pub fn next_frame(&mut self) -> Result<Option<IscpMessage>, FrameError> {
        if !self.sync_to_magic() {
            return Ok(None);
        }

        if self.buf.len() < HEADER_SIZE as usize {
            return Ok(None);
        }

        let header_size = read_u32(&self.buf[4..8]);
        let data_size = read_u32(&self.buf[8..12]);

        if !(HEADER_SIZE..=MAX_HEADER_SIZE).contains(&header_size) {
            self.buf.advance(MAGIC.len());
            return Err(FrameError::InvalidHeaderSize(header_size));
        }

        if data_size > MAX_DATA_SIZE {
            self.buf.advance(MAGIC.len());
            return Err(FrameError::Oversized {
                size: data_size,
                limit: MAX_DATA_SIZE,
            });
        }

        let total = header_size as usize + data_size as usize;
        if self.buf.len() < total {
            return Ok(None);
        }

        let packet = self.buf.split_to(total);
        IscpMessage::from_data(&packet[header_size as usize..]).map(Some)
    }

    /// Discard bytes until the buffer starts with the packet magic
    ///
    /// Returns false when no magic is buffered yet. A trailing partial
    /// magic is kept so it can complete on the next push.
    fn sync_to_magic(&mut self) -> bool {
        match self
            .buf
            .windows(MAGIC.len())
            .position(|window| window == MAGIC)
        {
            Some(0) => true,
            Some(offset) => {
                self.buf.advance(offset);
                true
            }
            None => {
                let keep = self.buf.len().min(MAGIC.len() - 1);
                let discard = self.buf.len() - keep;
                self.buf.advance(discard);
                false
            }
        }
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_be_bytes(raw)
}
