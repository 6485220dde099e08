use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::{crc16, CRC_SIZE};
use crate::error::{FrameError, Result};
use crate::protocol;

/// Frame delimiter.
pub const FLAG: u8 = 0x7E;

/// Escape prefix; the following byte is XORed with [`ESCAPE_XOR`].
pub const ESCAPE: u8 = 0x7D;

/// Mask applied to escaped bytes.
pub const ESCAPE_XOR: u8 = 0x20;

/// Header size: length + discriminator = 2 bytes.
pub const HEADER_SIZE: usize = 2;

/// Largest unescaped frame (header + payload + CRC).
pub const MTU: usize = 1514;

/// Largest payload the 10-bit length field can describe.
pub const MAX_LENGTH: usize = 0x3FF;

/// Largest payload when length bit 10 rides in the command byte.
pub const MAX_EXTENDED_LENGTH: usize = 0x7FF;

/// Bit of the command byte that carries length bit 10.
pub const XLEN_BIT: u8 = 0x80;

/// A validated, unescaped frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 6-bit sub-protocol discriminator.
    pub protocol: u8,
    /// Message payload; the first byte is the command.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(protocol: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            protocol,
            payload: payload.into(),
        }
    }

    /// The command byte, if any.
    pub fn command(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// The unescaped size of this frame (header + payload + CRC).
    pub fn raw_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }
}

/// Largest payload accepted for `protocol` within a frame of at most `max_frame` bytes.
pub fn max_payload_len(protocol: u8, max_frame: usize) -> usize {
    let field = if protocol::uses_extended_length(protocol) {
        MAX_EXTENDED_LENGTH
    } else {
        MAX_LENGTH
    };
    field.min(max_frame.saturating_sub(HEADER_SIZE + CRC_SIZE))
}

/// Pack the two header bytes.
///
/// Header layout:
/// ```text
///   byte 0            byte 1
/// ┌───────────────┬─────┬─────────────┐
/// │ len[9:2]      │ len │ protocol    │
/// │               │[1:0]│ [5:0]       │
/// └───────────────┴─────┴─────────────┘
/// ```
/// Extended-length protocols carry `len[10]` in bit 7 of the command byte.
pub fn pack_header(protocol: u8, len: usize) -> [u8; HEADER_SIZE] {
    let len = len & MAX_LENGTH;
    [
        (len >> 2) as u8,
        (((len & 0x03) as u8) << 6) | (protocol & protocol::MAX_PROTOCOL),
    ]
}

/// Unpack the two header bytes into (protocol, len[9:0]).
pub fn unpack_header(header: [u8; HEADER_SIZE]) -> (u8, usize) {
    let len = ((header[0] as usize) << 2) | ((header[1] >> 6) as usize);
    (header[1] & protocol::MAX_PROTOCOL, len)
}

/// Build the unescaped frame body (header + payload + CRC).
pub fn encode_raw(protocol: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if !protocol::is_valid(protocol) {
        return Err(FrameError::InvalidProtocol(protocol));
    }
    let max = max_payload_len(protocol, MTU);
    if payload.len() > max {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }

    let start = dst.len();
    dst.reserve(HEADER_SIZE + payload.len() + CRC_SIZE);
    dst.put_slice(&pack_header(protocol, payload.len()));
    dst.put_slice(payload);
    if protocol::uses_extended_length(protocol) {
        if let Some(cmd) = dst.get_mut(start + HEADER_SIZE) {
            *cmd &= !XLEN_BIT;
            if payload.len() > MAX_LENGTH {
                *cmd |= XLEN_BIT;
            }
        }
    }
    let crc = crc16(&dst[start..]);
    dst.put_u16(crc);
    Ok(())
}

/// Byte-stuff `raw` and wrap it in frame markers.
pub fn escape_into(raw: &[u8], dst: &mut BytesMut) {
    dst.reserve(raw.len() + raw.len() / 8 + 2);
    dst.put_u8(FLAG);
    for &b in raw {
        if b == FLAG || b == ESCAPE {
            dst.put_u8(ESCAPE);
            dst.put_u8(b ^ ESCAPE_XOR);
        } else {
            dst.put_u8(b);
        }
    }
    dst.put_u8(FLAG);
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬────────────────────────────────────────┬──────┐
/// │ 0x7E │ escaped( header | payload | CRC16 BE ) │ 0x7E │
/// └──────┴────────────────────────────────────────┴──────┘
/// ```
pub fn encode_frame(protocol: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let mut raw = BytesMut::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
    encode_raw(protocol, payload, &mut raw)?;
    escape_into(&raw, dst);
    Ok(())
}

/// Validate an unescaped frame body and split it into a [`Frame`].
pub fn decode_unescaped(raw: &[u8]) -> Result<Frame> {
    if raw.len() < HEADER_SIZE + CRC_SIZE {
        return Err(FrameError::TooShort(raw.len()));
    }

    let (body, trailer) = raw.split_at(raw.len() - CRC_SIZE);
    let received = u16::from_be_bytes([trailer[0], trailer[1]]);
    let computed = crc16(body);
    if computed != received {
        return Err(FrameError::InvalidCrc { computed, received });
    }

    let (protocol, mut declared) = unpack_header([body[0], body[1]]);
    let mut payload = BytesMut::from(&body[HEADER_SIZE..]);
    if protocol::uses_extended_length(protocol) {
        if let Some(cmd) = payload.first_mut() {
            if *cmd & XLEN_BIT != 0 {
                declared |= MAX_LENGTH + 1;
            }
            *cmd &= !XLEN_BIT;
        }
    }
    if declared != payload.len() {
        return Err(FrameError::MalformedHeader {
            declared,
            actual: payload.len(),
        });
    }

    Ok(Frame {
        protocol,
        payload: payload.freeze(),
    })
}

/// Decode one complete wire frame, markers included.
pub fn decode_frame(wire: &[u8]) -> Result<Frame> {
    let inner = match wire {
        [FLAG, inner @ .., FLAG] => inner,
        _ => return Err(FrameError::MissingMarker),
    };

    let mut raw = BytesMut::with_capacity(inner.len());
    let mut bytes = inner.iter();
    while let Some(&b) = bytes.next() {
        match b {
            FLAG => return Err(FrameError::MissingMarker),
            ESCAPE => match bytes.next() {
                Some(&next) if next != FLAG => raw.put_u8(next ^ ESCAPE_XOR),
                _ => return Err(FrameError::InvalidEscape),
            },
            _ => raw.put_u8(b),
        }
    }
    decode_unescaped(&raw)
}

/// Configuration for framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum unescaped frame size in bytes. Default: [`MTU`].
    pub max_frame_size: usize,
    /// Read timeout applied to the link; bounds one pump iteration.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout applied to the link.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: MTU,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ADP, COORD, MAC, MNGP, PRIME_API, SNIFFER};

    fn roundtrip(protocol: u8, payload: &[u8]) -> Frame {
        let mut wire = BytesMut::new();
        encode_frame(protocol, payload, &mut wire).unwrap();
        decode_frame(&wire).unwrap()
    }

    #[test]
    fn header_packing() {
        assert_eq!(pack_header(MAC, 3), [0x00, 0xE1]);
        assert_eq!(unpack_header([0x00, 0xE1]), (MAC, 3));
        assert_eq!(pack_header(ADP, 0x3FF), [0xFF, 0xE2]);
        assert_eq!(unpack_header([0xFF, 0xE2]), (ADP, 0x3FF));
    }

    #[test]
    fn literal_escaping_example() {
        let mut wire = BytesMut::new();
        encode_frame(MAC, &[0x01, 0x7E, 0x02], &mut wire).unwrap();

        assert_eq!(&wire[..3], &[FLAG, 0x00, 0xE1]);
        assert_eq!(&wire[3..7], &[0x01, 0x7D, 0x5E, 0x02]);
        assert_eq!(*wire.last().unwrap(), FLAG);

        let frame = decode_frame(&wire).unwrap();
        assert_eq!(frame.protocol, MAC);
        assert_eq!(frame.payload.as_ref(), &[0x01, 0x7E, 0x02]);
    }

    #[test]
    fn crc_is_big_endian() {
        let mut raw = BytesMut::new();
        encode_raw(ADP, &[0x12, 0x34], &mut raw).unwrap();
        let crc = crc16(&raw[..4]);
        assert_eq!(&raw[4..], &crc.to_be_bytes());
    }

    #[test]
    fn roundtrip_all_protocols() {
        for protocol in [MNGP, SNIFFER, MAC, ADP, COORD] {
            let frame = roundtrip(protocol, b"\x17hello");
            assert_eq!(frame.protocol, protocol);
            assert_eq!(frame.payload.as_ref(), b"\x17hello");
        }
    }

    #[test]
    fn roundtrip_special_bytes_at_every_offset() {
        for special in [FLAG, ESCAPE] {
            for offset in 0..16 {
                let mut payload = vec![0x55u8; 16];
                payload[offset] = special;
                let frame = roundtrip(ADP, &payload);
                assert_eq!(frame.payload.as_ref(), payload.as_slice());
            }
        }
    }

    #[test]
    fn no_marker_inside_escaped_body() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let mut wire = BytesMut::new();
        encode_frame(MAC, &payload, &mut wire).unwrap();
        let body = &wire[1..wire.len() - 1];
        assert!(!body.contains(&FLAG));
    }

    #[test]
    fn empty_payload() {
        let frame = roundtrip(SNIFFER, b"");
        assert_eq!(frame.protocol, SNIFFER);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn max_length_payload() {
        let payload = vec![0xA5; MAX_LENGTH];
        let frame = roundtrip(ADP, &payload);
        assert_eq!(frame.payload.len(), MAX_LENGTH);
    }

    #[test]
    fn oversized_payload_fails_loudly() {
        let mut wire = BytesMut::new();
        let err = encode_frame(ADP, &vec![0u8; MAX_LENGTH + 1], &mut wire).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 1024, max: MAX_LENGTH }
        ));
        assert!(wire.is_empty());
    }

    #[test]
    fn extended_length_uses_command_bit() {
        let mut payload = vec![0x33u8; 1200];
        payload[0] = 0x05;
        let mut raw = BytesMut::new();
        encode_raw(PRIME_API, &payload, &mut raw).unwrap();

        // 1200 = 0b100_1011_0000: bit 10 set, low bits 0x0B0.
        assert_eq!(unpack_header([raw[0], raw[1]]), (PRIME_API, 0x0B0));
        assert_eq!(raw[2], 0x85);

        let frame = decode_unescaped(&raw).unwrap();
        assert_eq!(frame.payload.len(), 1200);
        assert_eq!(frame.command(), Some(0x05));
    }

    #[test]
    fn extended_length_short_payload_clears_bit() {
        let frame = roundtrip(PRIME_API, &[0x85, 0x01]);
        assert_eq!(frame.payload.as_ref(), &[0x05, 0x01]);
    }

    #[test]
    fn extended_length_limited_by_mtu() {
        assert_eq!(max_payload_len(PRIME_API, MTU), MTU - 4);
        assert_eq!(max_payload_len(ADP, MTU), MAX_LENGTH);
    }

    #[test]
    fn invalid_protocol_rejected() {
        let mut wire = BytesMut::new();
        let err = encode_frame(0x40, b"x", &mut wire).unwrap_err();
        assert!(matches!(err, FrameError::InvalidProtocol(0x40)));
    }

    #[test]
    fn crc_mismatch_detected() {
        let mut raw = BytesMut::new();
        encode_raw(ADP, b"\x20abc", &mut raw).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert!(matches!(
            decode_unescaped(&raw),
            Err(FrameError::InvalidCrc { .. })
        ));
    }

    #[test]
    fn every_single_bit_flip_is_rejected() {
        let mut raw = BytesMut::new();
        encode_raw(MAC, &[0x52, 0x7E, 0x7D, 0x00, 0xFF], &mut raw).unwrap();
        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut corrupted = raw.to_vec();
                corrupted[byte] ^= 1 << bit;
                assert!(decode_unescaped(&corrupted).is_err(), "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let mut raw = BytesMut::new();
        raw.put_slice(&pack_header(ADP, 5));
        raw.put_slice(b"\x01\x02");
        let crc = crc16(&raw);
        raw.put_u16(crc);
        assert!(matches!(
            decode_unescaped(&raw),
            Err(FrameError::MalformedHeader { declared: 5, actual: 2 })
        ));
    }

    #[test]
    fn too_short_rejected() {
        assert!(matches!(
            decode_unescaped(&[0x00, 0x21, 0x00]),
            Err(FrameError::TooShort(3))
        ));
    }

    #[test]
    fn missing_markers_rejected() {
        assert!(matches!(
            decode_frame(&[0x00, 0x21]),
            Err(FrameError::MissingMarker)
        ));
        assert!(matches!(decode_frame(&[FLAG]), Err(FrameError::MissingMarker)));
    }

    #[test]
    fn dangling_escape_rejected() {
        assert!(matches!(
            decode_frame(&[FLAG, 0x00, 0x21, ESCAPE, FLAG]),
            Err(FrameError::InvalidEscape)
        ));
    }

    #[test]
    fn frame_helpers() {
        let frame = Frame::new(ADP, Bytes::from_static(b"\x1Babc"));
        assert_eq!(frame.command(), Some(0x1B));
        assert_eq!(frame.raw_size(), HEADER_SIZE + 4 + CRC_SIZE);
    }
}
