//! Network coordinator (bootstrap server) control messages, protocol id `0x23`.

use crate::getset::{GetConfirm, GetRequest, SetConfirm, SetRequest};

message_kinds! {
    /// Host to device.
    pub enum CoordRequestKind("coord") {
        Initialize = 50,
        SetRequest = 51,
        GetRequest = 52,
        KickRequest = 53,
        RekeyingRequest = 54,
    }
}

message_kinds! {
    /// Device to host: confirms and indications.
    pub enum CoordEventKind("coord") {
        SetConfirm = 60,
        GetConfirm = 61,
        JoinIndication = 62,
        LeaveIndication = 63,
    }
}

message_struct! {
    pub struct Initialize {}
}

message_struct! {
    /// Remove a device from the network.
    pub struct KickRequest {
        pub short_address: u16,
        pub extended_address: [u8; 8],
    }
}

message_struct! {
    pub struct RekeyingRequest {
        pub short_address: u16,
        pub extended_address: [u8; 8],
        /// Distribute the new group key (true) or activate it (false).
        pub distribute: bool,
    }
}

message_struct! {
    /// A device finished bootstrapping.
    pub struct JoinIndication {
        pub extended_address: [u8; 8],
        pub short_address: u16,
    }
}

message_struct! {
    pub struct LeaveIndication {
        pub short_address: u16,
    }
}

message_enum! {
    pub enum CoordRequest: CoordRequestKind {
        Initialize(Initialize),
        SetRequest(SetRequest),
        GetRequest(GetRequest),
        KickRequest(KickRequest),
        RekeyingRequest(RekeyingRequest),
    }
}

message_enum! {
    pub enum CoordEvent: CoordEventKind {
        SetConfirm(SetConfirm),
        GetConfirm(GetConfirm),
        JoinIndication(JoinIndication),
        LeaveIndication(LeaveIndication),
    }
}
