//! Table-driven attribute value codec.
//!
//! Every get/set message carries `(id: u32, index: u16, length: u8, value)`.
//! How `value` is laid out is decided by the attribute's row in a static
//! [`AttributeTable`]; ids with no row are carried as opaque bytes.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;

use crate::error::{CodecError, Result, ValidationError};
use crate::records::{Record, RecordKind};
use crate::wire::{put_u16, put_u32, Reader, WireOrder};

/// Codec settings shared by both ends of the link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Dual-media (PLC + RF) firmware: enables RF attributes and media-type trailers.
    pub hybrid: bool,
    /// Byte order of multi-byte attribute values.
    pub order: WireOrder,
}

impl CodecConfig {
    pub fn with_hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }

    pub fn with_order(mut self, order: WireOrder) -> Self {
        self.order = order;
        self
    }
}

/// Attribute address: id plus table index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    pub id: u32,
    pub index: u16,
}

impl AttributeRef {
    pub const fn new(id: u32, index: u16) -> Self {
        Self { id, index }
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}[{}]", self.id, self.index)
    }
}

/// Raw attribute value as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeValue {
    bytes: Bytes,
}

impl AttributeValue {
    /// Wrap raw bytes; fails if they cannot be described by the 8-bit length field.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > u8::MAX as usize {
            return Err(CodecError::FieldTooLong {
                field: "attribute value",
                len: bytes.len(),
                max: u8::MAX as usize,
            });
        }
        Ok(Self { bytes })
    }

    /// Bytes produced by the table encoder, already bounded by the table maximum.
    pub(crate) fn from_encoded(bytes: Bytes) -> Self {
        debug_assert!(bytes.len() <= u8::MAX as usize);
        Self { bytes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Length as declared on the wire.
    pub fn length(&self) -> u8 {
        self.bytes.len() as u8
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Whether the host may write an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Wire layout of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single byte.
    U8,
    /// Single byte holding 0 or 1.
    Bool,
    /// Two-byte integer in the configured order.
    U16,
    /// Four-byte integer in the configured order.
    U32,
    /// Fixed-size opaque bytes (addresses, keys, masks); never reordered.
    Bytes(usize),
    /// Fixed-size composite record.
    Record(RecordKind),
    /// Variable-length opaque bytes bounded by `max`.
    Blob { max: usize },
}

impl Layout {
    /// Exact encoded size, or `None` for variable-length blobs.
    pub fn fixed_len(self, cfg: &CodecConfig) -> Option<usize> {
        match self {
            Layout::U8 | Layout::Bool => Some(1),
            Layout::U16 => Some(2),
            Layout::U32 => Some(4),
            Layout::Bytes(n) => Some(n),
            Layout::Record(kind) => Some(kind.wire_len(cfg)),
            Layout::Blob { .. } => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::U8 => "u8",
            Layout::Bool => "bool",
            Layout::U16 => "u16",
            Layout::U32 => "u32",
            Layout::Bytes(_) => "bytes",
            Layout::Record(kind) => kind.name(),
            Layout::Blob { .. } => "blob",
        }
    }
}

/// One attribute table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub id: u32,
    pub name: &'static str,
    pub layout: Layout,
    pub access: Access,
    /// Only present in dual-media firmware.
    pub hybrid_only: bool,
}

impl AttributeSpec {
    pub const fn rw(id: u32, name: &'static str, layout: Layout) -> Self {
        Self {
            id,
            name,
            layout,
            access: Access::ReadWrite,
            hybrid_only: false,
        }
    }

    pub const fn ro(id: u32, name: &'static str, layout: Layout) -> Self {
        Self {
            id,
            name,
            layout,
            access: Access::ReadOnly,
            hybrid_only: false,
        }
    }

    pub const fn rf(self) -> Self {
        Self {
            hybrid_only: true,
            ..self
        }
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeData {
    U8(u8),
    Bool(bool),
    U16(u16),
    U32(u32),
    Bytes(Bytes),
    Record(Record),
}

impl AttributeData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeData::U8(_) => "u8",
            AttributeData::Bool(_) => "bool",
            AttributeData::U16(_) => "u16",
            AttributeData::U32(_) => "u32",
            AttributeData::Bytes(_) => "bytes",
            AttributeData::Record(r) => r.kind().name(),
        }
    }

    /// Integer view, for scalar layouts.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttributeData::U8(v) => Some((*v).into()),
            AttributeData::Bool(v) => Some((*v).into()),
            AttributeData::U16(v) => Some((*v).into()),
            AttributeData::U32(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeData::U8(v) => write!(f, "{v} ({v:#04x})"),
            AttributeData::Bool(v) => write!(f, "{v}"),
            AttributeData::U16(v) => write!(f, "{v} ({v:#06x})"),
            AttributeData::U32(v) => write!(f, "{v} ({v:#010x})"),
            AttributeData::Bytes(b) => {
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            AttributeData::Record(Record::Version(v)) => write!(f, "{v}"),
            AttributeData::Record(r) => write!(f, "{r:?}"),
        }
    }
}

/// Static attribute table for one layer.
#[derive(Debug)]
pub struct AttributeTable {
    pub name: &'static str,
    rows: &'static [AttributeSpec],
    max_len: usize,
    is_rf: fn(u32) -> bool,
}

impl AttributeTable {
    pub const fn new(
        name: &'static str,
        rows: &'static [AttributeSpec],
        max_len: usize,
        is_rf: fn(u32) -> bool,
    ) -> Self {
        Self {
            name,
            rows,
            max_len,
            is_rf,
        }
    }

    /// Largest value this layer accepts.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Whether `id` addresses the RF medium.
    pub fn is_rf(&self, id: u32) -> bool {
        (self.is_rf)(id)
    }

    /// Rows visible under `cfg`.
    pub fn rows<'a>(&'a self, cfg: &'a CodecConfig) -> impl Iterator<Item = &'static AttributeSpec> + 'a {
        self.rows.iter().filter(move |row| cfg.hybrid || !row.hybrid_only)
    }

    /// Row for `id`, hiding RF rows when `hybrid` is off.
    pub fn lookup(&self, id: u32, cfg: &CodecConfig) -> Option<&'static AttributeSpec> {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .filter(|row| cfg.hybrid || !row.hybrid_only)
    }

    /// Row by name (case-insensitive).
    pub fn lookup_name(&self, name: &str, cfg: &CodecConfig) -> Option<&'static AttributeSpec> {
        self.rows(cfg).find(|row| row.name.eq_ignore_ascii_case(name))
    }

    /// Decode a value by the attribute id it was carried with.
    ///
    /// Values longer than the layer maximum are refused, known row or not.
    pub fn decode_value(&self, id: u32, bytes: &[u8], cfg: &CodecConfig) -> Result<AttributeData> {
        self.check_len(bytes.len())?;
        let Some(row) = self.lookup(id, cfg) else {
            tracing::trace!(table = self.name, id, "no table row, value kept opaque");
            return Ok(AttributeData::Bytes(Bytes::copy_from_slice(bytes)));
        };

        let mut r = Reader::new(bytes);
        let data = match row.layout {
            Layout::U8 => AttributeData::U8(r.u8()?),
            Layout::Bool => {
                let b = r.u8()?;
                if b > 1 {
                    return Err(CodecError::InvalidField {
                        field: row.name,
                        value: b.into(),
                    });
                }
                AttributeData::Bool(b == 1)
            }
            Layout::U16 => AttributeData::U16(r.u16(cfg.order)?),
            Layout::U32 => AttributeData::U32(r.u32(cfg.order)?),
            Layout::Bytes(n) => AttributeData::Bytes(r.bytes(n)?),
            Layout::Record(kind) => AttributeData::Record(kind.decode(&mut r, cfg)?),
            Layout::Blob { max } => {
                if bytes.len() > max {
                    return Err(CodecError::FieldTooLong {
                        field: row.name,
                        len: bytes.len(),
                        max,
                    });
                }
                AttributeData::Bytes(r.rest())
            }
        };
        r.finish()?;
        Ok(data)
    }

    /// Encode a typed value for `id`.
    ///
    /// Unknown ids accept only raw bytes.
    pub fn encode_value(
        &self,
        id: u32,
        data: &AttributeData,
        cfg: &CodecConfig,
    ) -> std::result::Result<Bytes, ValidationError> {
        let mismatch = |expected: &'static str| ValidationError::LayoutMismatch {
            id,
            expected,
            actual: data.kind_name(),
        };

        let mut dst = BytesMut::new();
        match self.lookup(id, cfg) {
            None => match data {
                AttributeData::Bytes(b) => dst.put_slice(b),
                _ => return Err(mismatch("bytes")),
            },
            Some(row) => match (row.layout, data) {
                (Layout::U8, AttributeData::U8(v)) => dst.put_u8(*v),
                (Layout::Bool, AttributeData::Bool(v)) => dst.put_u8((*v).into()),
                (Layout::U16, AttributeData::U16(v)) => put_u16(&mut dst, *v, cfg.order),
                (Layout::U32, AttributeData::U32(v)) => put_u32(&mut dst, *v, cfg.order),
                (Layout::Bytes(n), AttributeData::Bytes(b)) => {
                    if b.len() != n {
                        return Err(mismatch("fixed-size bytes of the row length"));
                    }
                    dst.put_slice(b);
                }
                (Layout::Blob { max }, AttributeData::Bytes(b)) => {
                    if b.len() > max {
                        return Err(ValidationError::ValueTooLong {
                            id,
                            len: b.len(),
                            max,
                        });
                    }
                    dst.put_slice(b);
                }
                (Layout::Record(kind), AttributeData::Record(r)) if r.kind() == kind => {
                    r.encode(&mut dst, cfg)
                }
                (layout, _) => return Err(mismatch(layout.name())),
            },
        }

        if dst.len() > self.max_len {
            return Err(ValidationError::ValueTooLong {
                id,
                len: dst.len(),
                max: self.max_len,
            });
        }
        Ok(dst.freeze())
    }

    /// Refuse a received value longer than this layer allows.
    pub fn check_len(&self, len: usize) -> Result<()> {
        if len > self.max_len {
            return Err(CodecError::FieldTooLong {
                field: "attribute value",
                len,
                max: self.max_len,
            });
        }
        Ok(())
    }

    /// Check raw bytes bound for a set request against the row.
    pub fn validate_raw(
        &self,
        id: u32,
        bytes: &[u8],
        cfg: &CodecConfig,
    ) -> std::result::Result<(), ValidationError> {
        if bytes.len() > self.max_len {
            return Err(ValidationError::ValueTooLong {
                id,
                len: bytes.len(),
                max: self.max_len,
            });
        }
        let Some(row) = self.lookup(id, cfg) else {
            return Ok(());
        };
        if row.access == Access::ReadOnly {
            return Err(ValidationError::ReadOnly { id, name: row.name });
        }
        match row.layout.fixed_len(cfg) {
            Some(n) if n != bytes.len() => Err(ValidationError::LayoutMismatch {
                id,
                expected: row.layout.name(),
                actual: "value of a different length",
            }),
            None => match row.layout {
                Layout::Blob { max } if bytes.len() > max => Err(ValidationError::ValueTooLong {
                    id,
                    len: bytes.len(),
                    max,
                }),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SoftVersion;

    const ROWS: &[AttributeSpec] = &[
        AttributeSpec::rw(0x01, "ONE_BYTE", Layout::U8),
        AttributeSpec::rw(0x02, "FLAG", Layout::Bool),
        AttributeSpec::rw(0x03, "SHORT", Layout::U16),
        AttributeSpec::ro(0x04, "COUNTER", Layout::U32),
        AttributeSpec::rw(0x05, "KEY", Layout::Bytes(16)),
        AttributeSpec::rw(0x06, "NAME", Layout::Blob { max: 8 }),
        AttributeSpec::ro(0x07, "VERSION", Layout::Record(RecordKind::SoftVersion)),
        AttributeSpec::rw(0xD0, "RF_ONLY", Layout::U8).rf(),
    ];

    fn is_rf(id: u32) -> bool {
        (0xD0..=0xDF).contains(&id)
    }

    const TABLE: AttributeTable = AttributeTable::new("test", ROWS, 32, is_rf);

    fn be() -> CodecConfig {
        CodecConfig::default().with_order(WireOrder::Big)
    }

    #[test]
    fn overlong_values_are_refused_even_without_a_row() {
        let cfg = CodecConfig::default();
        let opaque = TABLE
            .decode_value(0x7F, &[0xAA; 32], &cfg)
            .expect("value at the table maximum decodes");
        assert!(matches!(opaque, AttributeData::Bytes(ref b) if b.len() == 32));

        assert!(matches!(
            TABLE.decode_value(0x7F, &[0xAA; 33], &cfg),
            Err(CodecError::FieldTooLong { len: 33, max: 32, .. })
        ));
        assert!(matches!(
            TABLE.decode_value(0x06, &[0xAA; 200], &cfg),
            Err(CodecError::FieldTooLong { len: 200, max: 32, .. })
        ));
    }

    #[test]
    fn lookup_hides_rf_rows_unless_hybrid() {
        assert!(TABLE.lookup(0xD0, &CodecConfig::default()).is_none());
        assert!(TABLE.lookup(0xD0, &CodecConfig::default().with_hybrid(true)).is_some());
        assert_eq!(TABLE.rows(&CodecConfig::default()).count(), ROWS.len() - 1);
        assert!(TABLE.is_rf(0xD3));
        assert_eq!(TABLE.lookup_name("short", &be()).unwrap().id, 0x03);
    }

    #[test]
    fn scalars_follow_wire_order() {
        let le = CodecConfig::default();
        assert_eq!(
            TABLE.decode_value(0x03, &[0x34, 0x12], &le).unwrap(),
            AttributeData::U16(0x1234)
        );
        assert_eq!(
            TABLE.decode_value(0x03, &[0x12, 0x34], &be()).unwrap(),
            AttributeData::U16(0x1234)
        );
        assert_eq!(
            TABLE
                .encode_value(0x04, &AttributeData::U32(1), &be())
                .unwrap()
                .as_ref(),
            &[0, 0, 0, 1]
        );
    }

    #[test]
    fn unknown_id_is_opaque() {
        let data = TABLE.decode_value(0x99, &[1, 2, 3], &be()).unwrap();
        assert_eq!(data, AttributeData::Bytes(Bytes::from_static(&[1, 2, 3])));
        assert!(TABLE.encode_value(0x99, &AttributeData::U8(1), &be()).is_err());
    }

    #[test]
    fn wrong_length_rejected_on_decode() {
        assert!(matches!(
            TABLE.decode_value(0x01, &[1, 2], &be()),
            Err(CodecError::TrailingBytes(1))
        ));
        assert!(matches!(
            TABLE.decode_value(0x03, &[1], &be()),
            Err(CodecError::Truncated { .. })
        ));
        assert!(TABLE.decode_value(0x02, &[2], &be()).is_err());
    }

    #[test]
    fn layout_mismatch_on_encode() {
        let err = TABLE
            .encode_value(0x03, &AttributeData::U8(1), &be())
            .unwrap_err();
        assert!(matches!(err, ValidationError::LayoutMismatch { id: 0x03, .. }));
        let err = TABLE
            .encode_value(0x05, &AttributeData::Bytes(Bytes::from_static(b"short")), &be())
            .unwrap_err();
        assert!(matches!(err, ValidationError::LayoutMismatch { .. }));
    }

    #[test]
    fn blob_bounded_by_row_max() {
        let err = TABLE
            .encode_value(0x06, &AttributeData::Bytes(Bytes::from_static(b"123456789")), &be())
            .unwrap_err();
        assert!(matches!(err, ValidationError::ValueTooLong { max: 8, .. }));
        assert!(TABLE.decode_value(0x06, b"123456789", &be()).is_err());
    }

    #[test]
    fn record_rows() {
        let v = SoftVersion {
            major: 2,
            ..SoftVersion::default()
        };
        let data = AttributeData::Record(Record::Version(v));
        let bytes = TABLE.encode_value(0x07, &data, &be()).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(TABLE.decode_value(0x07, &bytes, &be()).unwrap(), data);
    }

    #[test]
    fn validate_raw_checks_row() {
        assert!(TABLE.validate_raw(0x03, &[1, 2], &be()).is_ok());
        assert!(matches!(
            TABLE.validate_raw(0x03, &[1, 2, 3], &be()),
            Err(ValidationError::LayoutMismatch { .. })
        ));
        assert!(matches!(
            TABLE.validate_raw(0x04, &[0; 4], &be()),
            Err(ValidationError::ReadOnly { .. })
        ));
        assert!(matches!(
            TABLE.validate_raw(0x99, &[0; 33], &be()),
            Err(ValidationError::ValueTooLong { max: 32, .. })
        ));
        assert!(TABLE.validate_raw(0x99, &[0; 32], &be()).is_ok());
    }

    #[test]
    fn value_length_fits_u8() {
        assert!(AttributeValue::new(vec![0u8; 256]).is_err());
        let v = AttributeValue::new(vec![0u8; 255]).unwrap();
        assert_eq!(v.length(), 255);
    }

    #[test]
    fn display() {
        assert_eq!(AttributeData::U8(10).to_string(), "10 (0x0a)");
        assert_eq!(
            AttributeData::Bytes(Bytes::from_static(&[0xab, 0x01])).to_string(),
            "ab01"
        );
        assert_eq!(AttributeRef::new(0x0F, 0).to_string(), "0x0000000f[0]");
    }

    #[test]
    fn codec_config_from_json() {
        let cfg: CodecConfig = serde_json::from_str(r#"{"hybrid": true}"#).unwrap();
        assert!(cfg.hybrid);
        assert_eq!(cfg.order, WireOrder::Little);
    }
}
