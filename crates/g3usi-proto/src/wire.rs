//! Bounds-checked field access over message payloads.
//!
//! Message header fields (attribute ids, indexes, addresses, lengths) are
//! always big-endian. Attribute values and record fields follow the
//! configured [`WireOrder`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Deserialize;

use crate::error::{CodecError, Result};

/// Byte order of multi-byte attribute values on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first (native order of the modem MCU).
    #[default]
    Little,
}

/// Cursor that refuses to read past the end of its buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.len() < n {
            return Err(CodecError::Truncated {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn u16_be(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn u32_be(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn u16(&mut self, order: WireOrder) -> Result<u16> {
        self.need(2)?;
        Ok(match order {
            WireOrder::Big => self.buf.get_u16(),
            WireOrder::Little => self.buf.get_u16_le(),
        })
    }

    pub fn u32(&mut self, order: WireOrder) -> Result<u32> {
        self.need(4)?;
        Ok(match order {
            WireOrder::Big => self.buf.get_u32(),
            WireOrder::Little => self.buf.get_u32_le(),
        })
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.need(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    pub fn bytes(&mut self, n: usize) -> Result<Bytes> {
        self.need(n)?;
        Ok(self.buf.copy_to_bytes(n))
    }

    /// Read a big-endian u16 length prefix followed by that many bytes.
    pub fn bytes_u16_prefixed(&mut self) -> Result<Bytes> {
        let len = self.u16_be()? as usize;
        self.bytes(len)
    }

    /// Everything that is left.
    pub fn rest(&mut self) -> Bytes {
        let n = self.buf.len();
        self.buf.copy_to_bytes(n)
    }

    /// Fail if any bytes are left.
    pub fn finish(&self) -> Result<()> {
        match self.buf.len() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

pub fn put_u16(dst: &mut BytesMut, v: u16, order: WireOrder) {
    match order {
        WireOrder::Big => dst.put_u16(v),
        WireOrder::Little => dst.put_u16_le(v),
    }
}

pub fn put_u32(dst: &mut BytesMut, v: u32, order: WireOrder) {
    match order {
        WireOrder::Big => dst.put_u32(v),
        WireOrder::Little => dst.put_u32_le(v),
    }
}

/// Write a big-endian u16 length prefix followed by `data`.
pub fn put_u16_prefixed(dst: &mut BytesMut, field: &'static str, data: &[u8]) -> Result<()> {
    let len = u16::try_from(data.len()).map_err(|_| CodecError::FieldTooLong {
        field,
        len: data.len(),
        max: u16::MAX as usize,
    })?;
    dst.put_u16(len);
    dst.put_slice(data);
    Ok(())
}
