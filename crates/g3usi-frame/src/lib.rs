//! USI framing for G3-PLC modems.
//!
//! Every message on the link is framed as:
//! - A 0x7E start marker
//! - A 2-byte header packing a 10-bit length and a 6-bit protocol discriminator
//! - The payload, whose first byte is the command
//! - A big-endian CRC-16/CCITT over header + payload
//! - A 0x7E end marker
//!
//! with 0x7E/0x7D inside the frame escaped as 0x7D, byte ^ 0x20.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod crc;
pub mod error;
pub mod protocol;
pub mod reassembler;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::UsiCodec;
pub use codec::{
    decode_frame, decode_unescaped, encode_frame, max_payload_len, Frame, FrameConfig,
    HEADER_SIZE, MTU,
};
pub use error::{FrameError, Result};
pub use protocol::{protocol_name, uses_extended_length, ADP, COORD, MAC, MNGP, SNIFFER};
pub use reassembler::{Reassembler, ReassemblerStats, RxState};
pub use reader::FrameReader;
pub use writer::FrameWriter;
