//! Adaptation layer (ADP) control messages, protocol id `0x22`.

use bytes::{Bytes, BytesMut};

use crate::attribute::CodecConfig;
use crate::error::Result;
use crate::getset::{GetConfirm, GetRequest, SetConfirm, SetRequest};
use crate::message::{Address, MessageBody, WireField};
use crate::status::Status;
use crate::wire::Reader;

message_kinds! {
    /// Host to device.
    pub enum AdpRequestKind("adp") {
        Initialize = 10,
        DataRequest = 11,
        DiscoveryRequest = 12,
        NetworkStartRequest = 13,
        NetworkJoinRequest = 14,
        NetworkLeaveRequest = 15,
        ResetRequest = 16,
        SetRequest = 17,
        GetRequest = 18,
        LbpRequest = 19,
        RouteDiscoveryRequest = 20,
        PathDiscoveryRequest = 21,
        MacSetRequest = 22,
        MacGetRequest = 23,
    }
}

message_kinds! {
    /// Device to host: confirms and indications.
    pub enum AdpEventKind("adp") {
        DataConfirm = 30,
        DataIndication = 31,
        NetworkStatusIndication = 32,
        DiscoveryConfirm = 33,
        NetworkStartConfirm = 34,
        NetworkJoinConfirm = 35,
        NetworkLeaveConfirm = 36,
        NetworkLeaveIndication = 37,
        ResetConfirm = 38,
        SetConfirm = 39,
        GetConfirm = 40,
        LbpConfirm = 41,
        LbpIndication = 42,
        RouteDiscoveryConfirm = 43,
        PathDiscoveryConfirm = 44,
        MacSetConfirm = 45,
        MacGetConfirm = 46,
        BufferIndication = 47,
        DiscoveryIndication = 48,
        PreqIndication = 49,
    }
}

message_struct! {
    pub struct Initialize {
        /// PLC band plan (CENELEC-A, FCC, ARIB, ...).
        pub band: u8,
    }
}

message_struct! {
    pub struct DataRequest {
        pub handle: u8,
        pub discover_route: bool,
        pub quality_of_service: u8,
        pub security_enabled: bool,
        pub nsdu: Bytes,
    }
}

message_struct! {
    pub struct DiscoveryRequest {
        /// Seconds.
        pub duration: u8,
    }
}

message_struct! {
    pub struct NetworkStartRequest {
        pub pan_id: u16,
    }
}

message_struct! {
    pub struct NetworkJoinRequest {
        pub pan_id: u16,
        pub lba_address: u16,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct NetworkLeaveRequest {}
}

message_struct! {
    pub struct ResetRequest {}
}

message_struct! {
    /// Bootstrap (LBP) frame towards a joining device or the coordinator.
    pub struct LbpRequest {
        pub destination: Address,
        pub handle: u8,
        pub max_hops: u8,
        pub discover_route: bool,
        pub quality_of_service: u8,
        pub security_enabled: bool,
        pub nsdu: Bytes,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct RouteDiscoveryRequest {
        pub destination: u16,
        pub max_hops: u8,
    }
}

message_struct! {
    pub struct PathDiscoveryRequest {
        pub destination: u16,
        pub metric_type: u8,
    }
}

message_struct! {
    pub struct DataConfirm {
        pub status: Status,
        pub handle: u8,
    }
}

message_struct! {
    pub struct DataIndication {
        pub link_quality: u8,
        pub nsdu: Bytes,
    }
}

message_struct! {
    pub struct NetworkStatusIndication {
        pub pan_id: u16,
        pub source: Address,
        pub destination: Address,
        pub status: Status,
        pub security_level: u8,
        pub key_index: u8,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct StatusConfirm {
        pub status: Status,
    }
}

message_struct! {
    pub struct NetworkJoinConfirm {
        pub status: Status,
        pub network_address: u16,
        pub pan_id: u16,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct NetworkLeaveIndication {}
}

message_struct! {
    pub struct LbpConfirm {
        pub status: Status,
        pub handle: u8,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct LbpIndication {
        pub source: u16,
        pub nsdu: Bytes,
        pub link_quality: u8,
        pub security_enabled: bool,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    /// One hop of a discovered path.
    pub struct PathHop {
        pub address: u16,
        pub link_cost: u8,
        pub media_type: Option<u8>,
    }
}

impl WireField for PathHop {
    fn put(&self, dst: &mut BytesMut, cfg: &CodecConfig) -> Result<()> {
        self.encode_body(dst, cfg)
    }

    fn get(r: &mut Reader<'_>, cfg: &CodecConfig) -> Result<Self> {
        Self::decode_body(r, cfg)
    }
}

message_struct! {
    pub struct PathDiscoveryConfirm {
        pub status: Status,
        pub destination: u16,
        pub originator: u16,
        pub metric_type: u8,
        pub forward_path: Vec<PathHop>,
        pub reverse_path: Vec<PathHop>,
    }
}

message_struct! {
    pub struct BufferIndication {
        pub buffer_ready: bool,
    }
}

message_struct! {
    /// One PAN heard during network discovery.
    pub struct DiscoveryIndication {
        pub pan_id: u16,
        pub lba_address: u16,
        pub route_cost_to_coord: u16,
        pub link_quality: u8,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct PreqIndication {}
}

message_enum! {
    pub enum AdpRequest: AdpRequestKind {
        Initialize(Initialize),
        DataRequest(DataRequest),
        DiscoveryRequest(DiscoveryRequest),
        NetworkStartRequest(NetworkStartRequest),
        NetworkJoinRequest(NetworkJoinRequest),
        NetworkLeaveRequest(NetworkLeaveRequest),
        ResetRequest(ResetRequest),
        SetRequest(SetRequest),
        GetRequest(GetRequest),
        LbpRequest(LbpRequest),
        RouteDiscoveryRequest(RouteDiscoveryRequest),
        PathDiscoveryRequest(PathDiscoveryRequest),
        MacSetRequest(SetRequest),
        MacGetRequest(GetRequest),
    }
}

message_enum! {
    pub enum AdpEvent: AdpEventKind {
        DataConfirm(DataConfirm),
        DataIndication(DataIndication),
        NetworkStatusIndication(NetworkStatusIndication),
        DiscoveryConfirm(StatusConfirm),
        NetworkStartConfirm(StatusConfirm),
        NetworkJoinConfirm(NetworkJoinConfirm),
        NetworkLeaveConfirm(StatusConfirm),
        NetworkLeaveIndication(NetworkLeaveIndication),
        ResetConfirm(StatusConfirm),
        SetConfirm(SetConfirm),
        GetConfirm(GetConfirm),
        LbpConfirm(LbpConfirm),
        LbpIndication(LbpIndication),
        RouteDiscoveryConfirm(StatusConfirm),
        PathDiscoveryConfirm(PathDiscoveryConfirm),
        MacSetConfirm(SetConfirm),
        MacGetConfirm(GetConfirm),
        BufferIndication(BufferIndication),
        DiscoveryIndication(DiscoveryIndication),
        PreqIndication(PreqIndication),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeRef, AttributeValue};
    use crate::error::CodecError;

    #[test]
    fn kinds_cover_their_ranges() {
        assert_eq!(AdpRequestKind::ALL.len(), 14);
        assert_eq!(AdpEventKind::ALL.len(), 20);
        for code in 10..=23u8 {
            assert_eq!(AdpRequestKind::try_from(code).unwrap().code(), code);
        }
        for code in 30..=49u8 {
            assert_eq!(AdpEventKind::try_from(code).unwrap().code(), code);
        }
        assert!(matches!(
            AdpEventKind::try_from(50),
            Err(CodecError::UnknownKind { protocol: "adp", kind: 50 })
        ));
        assert_eq!(AdpEventKind::GetConfirm.to_string(), "GetConfirm");
    }

    #[test]
    fn get_request_for_max_hops() {
        let req = AdpRequest::GetRequest(GetRequest::new(0x0000_000F, 0));
        let bytes = req.encode(&CodecConfig::default()).unwrap();
        assert_eq!(bytes.as_ref(), &[18, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00]);
        assert_eq!(AdpRequest::decode(&bytes, &CodecConfig::default()).unwrap(), req);
    }

    #[test]
    fn get_confirm_event() {
        let payload = [40, 0x00, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x01, 0x0A];
        let ev = AdpEvent::decode(&payload, &CodecConfig::default()).unwrap();
        assert_eq!(ev.kind(), AdpEventKind::GetConfirm);
        let AdpEvent::GetConfirm(cfm) = ev else {
            panic!("wrong variant");
        };
        assert_eq!(cfm.attr, AttributeRef::new(0x0F, 0));
        assert_eq!(cfm.value, AttributeValue::new(vec![0x0A]).unwrap());
    }

    #[test]
    fn shared_bodies_keep_their_own_kind() {
        let cfg = CodecConfig::default();
        let ev = AdpEvent::MacSetConfirm(SetConfirm::default());
        let bytes = ev.encode(&cfg).unwrap();
        assert_eq!(bytes[0], 45);
        assert_eq!(AdpEvent::decode(&bytes, &cfg).unwrap().kind(), AdpEventKind::MacSetConfirm);
    }

    #[test]
    fn join_request_media_trailer() {
        let req = AdpRequest::NetworkJoinRequest(NetworkJoinRequest {
            pan_id: 0x781D,
            lba_address: 0x0000,
            media_type: Some(1),
        });
        let plc = req.encode(&CodecConfig::default()).unwrap();
        let hybrid = req.encode(&CodecConfig::default().with_hybrid(true)).unwrap();
        assert_eq!(plc.as_ref(), &[14, 0x78, 0x1D, 0x00, 0x00]);
        assert_eq!(hybrid.as_ref(), &[14, 0x78, 0x1D, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn data_request_layout() {
        let req = AdpRequest::DataRequest(DataRequest {
            handle: 7,
            discover_route: true,
            quality_of_service: 0,
            security_enabled: true,
            nsdu: Bytes::from_static(&[0x60, 0x00]),
        });
        let bytes = req.encode(&CodecConfig::default()).unwrap();
        assert_eq!(bytes.as_ref(), &[11, 7, 1, 0, 1, 0x00, 0x02, 0x60, 0x00]);
    }

    #[test]
    fn path_discovery_confirm_lists() {
        let cfg = CodecConfig::default().with_hybrid(true);
        let ev = AdpEvent::PathDiscoveryConfirm(PathDiscoveryConfirm {
            status: Status::Success,
            destination: 0x0002,
            originator: 0x0000,
            metric_type: 0x0F,
            forward_path: vec![
                PathHop {
                    address: 0x0001,
                    link_cost: 3,
                    media_type: Some(0),
                },
                PathHop {
                    address: 0x0002,
                    link_cost: 5,
                    media_type: Some(1),
                },
            ],
            reverse_path: vec![],
        });
        let bytes = ev.encode(&cfg).unwrap();
        assert_eq!(bytes.len(), 1 + 1 + 2 + 2 + 1 + 1 + 2 * 4 + 1);
        assert_eq!(AdpEvent::decode(&bytes, &cfg).unwrap(), ev);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let payload = [38, 0x00, 0xFF];
        assert!(matches!(
            AdpEvent::decode(&payload, &CodecConfig::default()),
            Err(CodecError::TrailingBytes(1))
        ));
    }

    #[test]
    fn unknown_command_rejected() {
        assert!(matches!(
            AdpEvent::decode(&[0x99], &CodecConfig::default()),
            Err(CodecError::UnknownKind { .. })
        ));
        assert!(matches!(
            AdpEvent::decode(&[], &CodecConfig::default()),
            Err(CodecError::Empty)
        ));
    }
}
