//! Private eISCP codec for Onkyo/Integra receiver communication
//!
//! This crate provides the minimal wire layer the transport needs: building
//! eISCP packets around ISCP messages and decoding a TCP byte stream back
//! into messages. It performs no I/O of its own.
//!
//! ```rust
//! use eiscp_client::{encode, FrameDecoder};
//!
//! let packet = encode("PWR01");
//! let mut decoder = FrameDecoder::new();
//! decoder.push(&packet);
//! let message = decoder.next_frame().unwrap().unwrap();
//! assert_eq!(message.code(), "PWR");
//! assert_eq!(message.payload(), "01");
//! ```

mod decoder;
mod error;
mod packet;

pub use decoder::FrameDecoder;
pub use error::FrameError;
pub use packet::{
    encode, IscpMessage, DEFAULT_PORT, HEADER_SIZE, MAGIC, MAX_DATA_SIZE, MAX_HEADER_SIZE,
};
