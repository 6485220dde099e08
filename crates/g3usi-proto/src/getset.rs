//! Attribute get/set bodies shared by the ADP, MAC and coordinator catalogs.
//!
//! ```text
//! GetRequest   id:u32 index:u16
//! SetRequest   id:u32 index:u16 len:u8 value[len]
//! GetConfirm   status:u8 id:u32 index:u16 len:u8 value[len]
//! SetConfirm   status:u8 id:u32 index:u16
//! ```
//!
//! A failed GetConfirm may stop after the index; the value is then empty.

use bytes::{BufMut, Bytes, BytesMut};

use crate::attribute::{
    Access, AttributeData, AttributeRef, AttributeTable, AttributeValue, CodecConfig,
};
use crate::error::{Result, ValidationError};
use crate::message::MessageBody;
use crate::status::Status;
use crate::wire::Reader;

fn put_ref(dst: &mut BytesMut, attr: AttributeRef) {
    dst.put_u32(attr.id);
    dst.put_u16(attr.index);
}

fn get_ref(r: &mut Reader<'_>) -> Result<AttributeRef> {
    Ok(AttributeRef::new(r.u32_be()?, r.u16_be()?))
}

fn put_value(dst: &mut BytesMut, value: &AttributeValue) {
    dst.put_u8(value.length());
    dst.put_slice(value.as_bytes());
}

fn get_value(r: &mut Reader<'_>) -> Result<AttributeValue> {
    let len = r.u8()?;
    AttributeValue::new(r.bytes(len.into())?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetRequest {
    pub attr: AttributeRef,
}

impl GetRequest {
    pub fn new(id: u32, index: u16) -> Self {
        Self {
            attr: AttributeRef::new(id, index),
        }
    }
}

impl MessageBody for GetRequest {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        put_ref(dst, self.attr);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        Ok(Self { attr: get_ref(r)? })
    }
}

/// Set request body. Built only through [`SetRequest::build`] or
/// [`SetRequest::from_raw`], or decoded off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRequest {
    attr: AttributeRef,
    value: AttributeValue,
}

impl SetRequest {
    pub fn attr(&self) -> AttributeRef {
        self.attr
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Encode a typed value through `table` and check the produced length
    /// against `declared_len`. Nothing is built on mismatch.
    pub fn build(
        table: &AttributeTable,
        attr: AttributeRef,
        data: &AttributeData,
        declared_len: u8,
        cfg: &CodecConfig,
    ) -> std::result::Result<Self, ValidationError> {
        if let Some(row) = table.lookup(attr.id, cfg) {
            if row.access == Access::ReadOnly {
                return Err(ValidationError::ReadOnly {
                    id: attr.id,
                    name: row.name,
                });
            }
        }
        let bytes = table.encode_value(attr.id, data, cfg)?;
        if bytes.len() != usize::from(declared_len) {
            return Err(ValidationError::LengthMismatch {
                id: attr.id,
                declared: declared_len,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            attr,
            value: AttributeValue::from_encoded(bytes),
        })
    }

    /// Wrap caller-encoded bytes after checking them against the table row.
    pub fn from_raw(
        table: &AttributeTable,
        attr: AttributeRef,
        bytes: impl Into<Bytes>,
        cfg: &CodecConfig,
    ) -> std::result::Result<Self, ValidationError> {
        let bytes = bytes.into();
        table.validate_raw(attr.id, &bytes, cfg)?;
        Ok(Self {
            attr,
            value: AttributeValue::from_encoded(bytes),
        })
    }

    /// Typed view of the value.
    pub fn data(&self, table: &AttributeTable, cfg: &CodecConfig) -> Result<AttributeData> {
        table.decode_value(self.attr.id, self.value.as_bytes(), cfg)
    }
}

impl MessageBody for SetRequest {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        put_ref(dst, self.attr);
        put_value(dst, &self.value);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            attr: get_ref(r)?,
            value: get_value(r)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetConfirm {
    pub status: Status,
    pub attr: AttributeRef,
    pub value: AttributeValue,
}

impl GetConfirm {
    pub fn success(attr: AttributeRef, value: AttributeValue) -> Self {
        Self {
            status: Status::Success,
            attr,
            value,
        }
    }

    pub fn failure(status: Status, attr: AttributeRef) -> Self {
        Self {
            status,
            attr,
            value: AttributeValue::empty(),
        }
    }

    /// Decode the value by the id this confirm carries.
    ///
    /// `None` when the device reported a failure.
    pub fn data(&self, table: &AttributeTable, cfg: &CodecConfig) -> Result<Option<AttributeData>> {
        if !self.status.is_success() {
            return Ok(None);
        }
        table
            .decode_value(self.attr.id, self.value.as_bytes(), cfg)
            .map(Some)
    }
}

impl MessageBody for GetConfirm {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8(self.status.code());
        put_ref(dst, self.attr);
        put_value(dst, &self.value);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        let status = Status::from(r.u8()?);
        let attr = get_ref(r)?;
        let value = if r.is_empty() && !status.is_success() {
            AttributeValue::empty()
        } else {
            get_value(r)?
        };
        Ok(Self {
            status,
            attr,
            value,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetConfirm {
    pub status: Status,
    pub attr: AttributeRef,
}

impl MessageBody for SetConfirm {
    fn encode_body(&self, dst: &mut BytesMut, _cfg: &CodecConfig) -> Result<()> {
        dst.put_u8(self.status.code());
        put_ref(dst, self.attr);
        Ok(())
    }

    fn decode_body(r: &mut Reader<'_>, _cfg: &CodecConfig) -> Result<Self> {
        Ok(Self {
            status: Status::from(r.u8()?),
            attr: get_ref(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::tables::{adp, mac, ADP_TABLE, MAC_TABLE};
    use crate::wire::WireOrder;

    fn encode<T: MessageBody>(msg: &T) -> Vec<u8> {
        let mut dst = BytesMut::new();
        msg.encode_body(&mut dst, &CodecConfig::default()).unwrap();
        dst.to_vec()
    }

    fn decode<T: MessageBody>(bytes: &[u8]) -> Result<T> {
        let mut r = Reader::new(bytes);
        let msg = T::decode_body(&mut r, &CodecConfig::default())?;
        r.finish()?;
        Ok(msg)
    }

    #[test]
    fn max_hops_get_request_layout() {
        let req = GetRequest::new(adp::MAX_HOPS, 0);
        assert_eq!(encode(&req), vec![0x00, 0x00, 0x00, 0x0F, 0x00, 0x00]);
    }

    #[test]
    fn max_hops_get_confirm_decodes() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x01, 0x0A];
        let cfm: GetConfirm = decode(&bytes).unwrap();
        assert!(cfm.status.is_success());
        assert_eq!(cfm.attr, AttributeRef::new(0x0F, 0));
        assert_eq!(cfm.value.length(), 1);
        assert_eq!(cfm.value.as_bytes(), &[0x0A]);
        let data = cfm.data(&ADP_TABLE, &CodecConfig::default()).unwrap();
        assert_eq!(data, Some(AttributeData::U8(0x0A)));
    }

    #[test]
    fn failed_get_confirm_may_omit_value() {
        let bytes = [0xF4, 0x00, 0x00, 0x00, 0x99, 0x00, 0x00];
        let cfm: GetConfirm = decode(&bytes).unwrap();
        assert_eq!(cfm.status, Status::UnsupportedAttribute);
        assert!(cfm.value.is_empty());
        assert_eq!(cfm.data(&ADP_TABLE, &CodecConfig::default()).unwrap(), None);
    }

    #[test]
    fn successful_get_confirm_requires_length() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00];
        assert!(matches!(
            decode::<GetConfirm>(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn get_confirm_branches_on_carried_id() {
        let cfg = CodecConfig::default().with_order(WireOrder::Big);
        let cfm = GetConfirm::success(
            AttributeRef::new(mac::PAN_ID, 0),
            AttributeValue::new(vec![0x78, 0x1D]).unwrap(),
        );
        assert_eq!(
            cfm.data(&MAC_TABLE, &cfg).unwrap(),
            Some(AttributeData::U16(0x781D))
        );
    }

    #[test]
    fn set_request_length_must_match() {
        let cfg = CodecConfig::default();
        let attr = AttributeRef::new(adp::MAX_HOPS, 0);
        let err = SetRequest::build(&ADP_TABLE, attr, &AttributeData::U8(8), 2, &cfg).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                id: adp::MAX_HOPS,
                declared: 2,
                actual: 1
            }
        );
        assert_eq!(Status::from(err), Status::InvalidParameter);

        let req = SetRequest::build(&ADP_TABLE, attr, &AttributeData::U8(8), 1, &cfg).unwrap();
        assert_eq!(encode(&req), vec![0, 0, 0, 0x0F, 0, 0, 1, 8]);
    }

    #[test]
    fn set_request_refuses_read_only() {
        let cfg = CodecConfig::default();
        let attr = AttributeRef::new(adp::SOFT_VERSION, 0);
        assert!(matches!(
            SetRequest::from_raw(&ADP_TABLE, attr, vec![0u8; 6], &cfg),
            Err(ValidationError::ReadOnly { .. })
        ));
        assert!(matches!(
            SetRequest::build(&ADP_TABLE, attr, &AttributeData::U8(0), 1, &cfg),
            Err(ValidationError::ReadOnly { .. })
        ));
    }

    #[test]
    fn set_request_raw_is_checked_against_row() {
        let cfg = CodecConfig::default();
        let attr = AttributeRef::new(mac::PAN_ID, 0);
        assert!(SetRequest::from_raw(&MAC_TABLE, attr, vec![1u8, 2], &cfg).is_ok());
        assert!(SetRequest::from_raw(&MAC_TABLE, attr, vec![1u8, 2, 3], &cfg).is_err());
        let long = AttributeRef::new(0x0800_00FF, 0);
        assert!(matches!(
            SetRequest::from_raw(&ADP_TABLE, long, vec![0u8; 65], &cfg),
            Err(ValidationError::ValueTooLong { max: 64, .. })
        ));
    }

    #[test]
    fn set_confirm_layout() {
        let cfm: SetConfirm = decode(&[0xFB, 0, 0, 0, 0x1C, 0, 0]).unwrap();
        assert_eq!(cfm.status, Status::ReadOnly);
        assert_eq!(cfm.attr.id, adp::SOFT_VERSION);
    }
}
