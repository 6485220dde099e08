//! MAC layer control messages, protocol id `0x21`.

use bytes::Bytes;

use crate::getset::{GetConfirm, GetRequest, SetConfirm, SetRequest};
use crate::message::Address;
use crate::status::Status;

message_kinds! {
    /// Host to device.
    pub enum MacRequestKind("mac") {
        Initialize = 70,
        DataRequest = 71,
        GetRequest = 72,
        SetRequest = 73,
        ResetRequest = 74,
        ScanRequest = 75,
        StartRequest = 76,
    }
}

message_kinds! {
    /// Device to host: confirms and indications.
    pub enum MacEventKind("mac") {
        DataConfirm = 80,
        DataIndication = 81,
        GetConfirm = 82,
        SetConfirm = 83,
        ResetConfirm = 84,
        ScanConfirm = 85,
        BeaconNotify = 86,
        StartConfirm = 87,
        CommStatusIndication = 88,
    }
}

message_struct! {
    pub struct Initialize {
        pub band: u8,
    }
}

message_struct! {
    pub struct DataRequest {
        /// Addressing mode of the source field in the transmitted frame.
        pub source_address_mode: u8,
        pub destination_pan_id: u16,
        pub destination: Address,
        pub handle: u8,
        pub tx_options: u8,
        pub security_level: u8,
        pub key_index: u8,
        pub quality_of_service: u8,
        pub media_type: Option<u8>,
        pub msdu: Bytes,
    }
}

message_struct! {
    pub struct ResetRequest {
        pub set_default_pib: bool,
    }
}

message_struct! {
    pub struct ScanRequest {
        /// Seconds.
        pub duration: u16,
    }
}

message_struct! {
    pub struct StartRequest {
        pub pan_id: u16,
    }
}

message_struct! {
    pub struct DataConfirm {
        pub handle: u8,
        pub status: Status,
        pub timestamp: u32,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct DataIndication {
        pub source_pan_id: u16,
        pub source: Address,
        pub destination_pan_id: u16,
        pub destination: Address,
        pub link_quality: u8,
        pub dsn: u8,
        pub timestamp: u32,
        pub security_level: u8,
        pub key_index: u8,
        pub quality_of_service: u8,
        pub media_type: Option<u8>,
        pub msdu: Bytes,
    }
}

message_struct! {
    pub struct StatusConfirm {
        pub status: Status,
    }
}

message_struct! {
    /// PAN descriptor of a received beacon.
    pub struct BeaconNotify {
        pub pan_id: u16,
        pub link_quality: u8,
        pub lba_address: u16,
        pub route_cost_to_coord: u16,
        pub media_type: Option<u8>,
    }
}

message_struct! {
    pub struct CommStatusIndication {
        pub pan_id: u16,
        pub source: Address,
        pub destination: Address,
        pub status: Status,
        pub security_level: u8,
        pub key_index: u8,
        pub media_type: Option<u8>,
    }
}

message_enum! {
    pub enum MacRequest: MacRequestKind {
        Initialize(Initialize),
        DataRequest(DataRequest),
        GetRequest(GetRequest),
        SetRequest(SetRequest),
        ResetRequest(ResetRequest),
        ScanRequest(ScanRequest),
        StartRequest(StartRequest),
    }
}

message_enum! {
    pub enum MacEvent: MacEventKind {
        DataConfirm(DataConfirm),
        DataIndication(DataIndication),
        GetConfirm(GetConfirm),
        SetConfirm(SetConfirm),
        ResetConfirm(StatusConfirm),
        ScanConfirm(StatusConfirm),
        BeaconNotify(BeaconNotify),
        StartConfirm(StatusConfirm),
        CommStatusIndication(CommStatusIndication),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeRef, CodecConfig};
    use crate::tables::mac as pib;

    #[test]
    fn kinds_cover_their_ranges() {
        assert_eq!(MacRequestKind::ALL.len(), 7);
        assert_eq!(MacEventKind::ALL.len(), 9);
        for code in 80..=88u8 {
            assert!(MacEventKind::try_from(code).is_ok());
        }
        assert!(MacEventKind::try_from(79).is_err());
    }

    #[test]
    fn get_request_layout() {
        let req = MacRequest::GetRequest(GetRequest::new(pib::SHORT_ADDRESS, 0));
        let bytes = req.encode(&CodecConfig::default()).unwrap();
        assert_eq!(bytes.as_ref(), &[72, 0x00, 0x00, 0x00, 0x53, 0x00, 0x00]);
    }

    #[test]
    fn set_confirm_event() {
        let payload = [83, 0x00, 0x00, 0x00, 0x00, 0x50, 0x00, 0x00];
        let ev = MacEvent::decode(&payload, &CodecConfig::default()).unwrap();
        assert_eq!(
            ev,
            MacEvent::SetConfirm(SetConfirm {
                status: Status::Success,
                attr: AttributeRef::new(pib::PAN_ID, 0),
            })
        );
    }

    #[test]
    fn data_indication_round_trip() {
        let cfg = CodecConfig::default().with_hybrid(true);
        let ev = MacEvent::DataIndication(DataIndication {
            source_pan_id: 0x781D,
            source: Address::Extended([0x00, 0x80, 0xE1, 0x00, 0x00, 0x00, 0x00, 0x01]),
            destination_pan_id: 0x781D,
            destination: Address::Short(0x0000),
            link_quality: 0x30,
            dsn: 9,
            timestamp: 0x0001_0203,
            security_level: 5,
            key_index: 0,
            quality_of_service: 0,
            media_type: Some(1),
            msdu: Bytes::from_static(b"\x41\x88\x7e"),
        });
        let bytes = ev.encode(&cfg).unwrap();
        assert_eq!(MacEvent::decode(&bytes, &cfg).unwrap(), ev);
        // Without the media trailer the body no longer lines up.
        assert!(MacEvent::decode(&bytes, &CodecConfig::default()).is_err());
    }

    #[test]
    fn beacon_notify_layout() {
        let payload = [86, 0x78, 0x1D, 0x40, 0x00, 0x05, 0x00, 0x10];
        let ev = MacEvent::decode(&payload, &CodecConfig::default()).unwrap();
        let MacEvent::BeaconNotify(b) = ev else {
            panic!("wrong variant");
        };
        assert_eq!(b.pan_id, 0x781D);
        assert_eq!(b.link_quality, 0x40);
        assert_eq!(b.lba_address, 0x0005);
        assert_eq!(b.route_cost_to_coord, 0x0010);
        assert_eq!(b.media_type, None);
    }
}
