//! Device management protocol (MNGP), protocol id `0x00`.
//!
//! Parameters are addressed by 16-bit tags. Plain parameters are fetched with
//! a GetQuery listing several tags; list-valued parameters (connected nodes)
//! are paged with EnumQuery/EnumResponse until the device clears the
//! "more" flag.
//!
//! ```text
//! GetQuery      tag:u16 ...
//! GetResponse   (tag:u16 len:u16 value[len]) ...
//! EnumQuery     tag:u16 start:u16 max:u8
//! EnumResponse  tag:u16 flags:u8 start:u16 count:u8 (len:u8 record[len]) * count
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::attribute::CodecConfig;
use crate::error::{CodecError, Result};
use crate::message::MessageBody;
use crate::wire::{put_u16_prefixed, Reader};

pub const TAG_FIRMWARE_VERSION: u16 = 0x0001;
pub const TAG_EXTENDED_ADDRESS: u16 = 0x0002;
pub const TAG_PAN_ID: u16 = 0x0003;
pub const TAG_SHORT_ADDRESS: u16 = 0x0004;
pub const TAG_BAND: u16 = 0x0005;
/// Enumerable: one [`ConnectedNode`] per record.
pub const TAG_CONNECTED_NODES: u16 = 0x0100;

/// `flags` bit 0: more records follow.
const FLAG_MORE: u8 = 0x01;

message_kinds! {
    pub enum MngpKind("mngp") {
        GetQuery = 0x01,
        GetResponse = 0x02,
        EnumQuery = 0x03,
        EnumResponse = 0x04,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetQuery {
    pub tags: Vec<u16>,
}

impl MessageBody for GetQuery {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        for tag in &self.tags {
            dst.put_u16(*tag);
        }
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        let mut tags = Vec::with_capacity(r.remaining() / 2);
        while !r.is_empty() {
            tags.push(r.u16_be()?);
        }
        Ok(Self { tags })
    }
}

/// One tag/value pair of a [`GetResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    pub tag: u16,
    pub value: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetResponse {
    pub values: Vec<TagValue>,
}

impl GetResponse {
    pub fn get(&self, tag: u16) -> Option<&Bytes> {
        self.values.iter().find(|tv| tv.tag == tag).map(|tv| &tv.value)
    }
}

impl MessageBody for GetResponse {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        for tv in &self.values {
            dst.put_u16(tv.tag);
            put_u16_prefixed(dst, "parameter value", &tv.value)?;
        }
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        let mut values = Vec::new();
        while !r.is_empty() {
            let tag = r.u16_be()?;
            let value = r.bytes_u16_prefixed()?;
            values.push(TagValue { tag, value });
        }
        Ok(Self { values })
    }
}

message_struct! {
    pub struct EnumQuery {
        pub tag: u16,
        pub start_index: u16,
        pub max_count: u8,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumResponse {
    pub tag: u16,
    pub more: bool,
    pub start_index: u16,
    pub records: Vec<Bytes>,
}

impl EnumResponse {
    /// Query for the page after this one, if the device announced more.
    ///
    /// A page that announces more but carries no records, or whose next
    /// offset leaves the 16-bit index range, cannot make progress.
    pub fn next_query(&self, max_count: u8) -> Result<Option<EnumQuery>> {
        if !self.more {
            return Ok(None);
        }
        if self.records.is_empty() {
            return Err(CodecError::InvalidField {
                field: "empty enum page with more flag",
                value: self.start_index.into(),
            });
        }
        let start_index = u16::try_from(self.records.len())
            .ok()
            .and_then(|n| self.start_index.checked_add(n))
            .ok_or(CodecError::InvalidField {
                field: "enum start index overflow",
                value: self.start_index.into(),
            })?;
        Ok(Some(EnumQuery {
            tag: self.tag,
            start_index,
            max_count,
        }))
    }

    /// Records of a [`TAG_CONNECTED_NODES`] page.
    pub fn connected_nodes(&self) -> Result<Vec<ConnectedNode>> {
        self.records
            .iter()
            .map(|rec| ConnectedNode::from_record(rec))
            .collect()
    }
}

impl MessageBody for EnumResponse {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        let count = u8::try_from(self.records.len()).map_err(|_| CodecError::FieldTooLong {
            field: "enum records",
            len: self.records.len(),
            max: u8::MAX as usize,
        })?;
        dst.put_u16(self.tag);
        dst.put_u8(if self.more { FLAG_MORE } else { 0 });
        dst.put_u16(self.start_index);
        dst.put_u8(count);
        for rec in &self.records {
            let len = u8::try_from(rec.len()).map_err(|_| CodecError::FieldTooLong {
                field: "enum record",
                len: rec.len(),
                max: u8::MAX as usize,
            })?;
            dst.put_u8(len);
            dst.put_slice(rec);
        }
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        let tag = r.u16_be()?;
        let flags = r.u8()?;
        let start_index = r.u16_be()?;
        let count = r.u8()?;
        let mut records = Vec::with_capacity(count.into());
        for _ in 0..count {
            let len = r.u8()?;
            records.push(r.bytes(len.into())?);
        }
        Ok(Self {
            tag,
            more: flags & FLAG_MORE != 0,
            start_index,
            records,
        })
    }
}

message_struct! {
    /// Entry of the connected-node list.
    pub struct ConnectedNode {
        pub extended_address: [u8; 8],
        pub short_address: u16,
    }
}

impl ConnectedNode {
    pub fn from_record(rec: &[u8]) -> Result<Self> {
        let cfg = CodecConfig::default();
        let mut r = Reader::new(rec);
        let node = Self::decode_body(&mut r, &cfg)?;
        r.finish()?;
        Ok(node)
    }

    pub fn to_record(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(10);
        dst.put_slice(&self.extended_address);
        dst.put_u16(self.short_address);
        dst.freeze()
    }
}

message_enum! {
    pub enum MngpMessage: MngpKind {
        GetQuery(GetQuery),
        GetResponse(GetResponse),
        EnumQuery(EnumQuery),
        EnumResponse(EnumResponse),
    }
}

/// Walks an enumerable parameter page by page.
#[derive(Debug, Clone)]
pub struct EnumCursor {
    next: Option<EnumQuery>,
    max_count: u8,
}

impl EnumCursor {
    pub fn new(tag: u16, max_count: u8) -> Self {
        Self {
            next: Some(EnumQuery {
                tag,
                start_index: 0,
                max_count,
            }),
            max_count,
        }
    }

    /// The query to send next; `None` once the last page was seen.
    pub fn query(&self) -> Option<&EnumQuery> {
        self.next.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.next.is_none()
    }

    /// Accept a page; fails if it answers a different tag or offset.
    pub fn advance(&mut self, resp: &EnumResponse) -> Result<()> {
        let Some(expected) = &self.next else {
            return Err(CodecError::InvalidField {
                field: "enum page after last",
                value: resp.start_index.into(),
            });
        };
        if resp.tag != expected.tag {
            return Err(CodecError::InvalidField {
                field: "enum tag",
                value: resp.tag.into(),
            });
        }
        if resp.start_index != expected.start_index {
            return Err(CodecError::InvalidField {
                field: "enum start index",
                value: resp.start_index.into(),
            });
        }
        self.next = resp.next_query(self.max_count)?;
        Ok(())
    }
}
