use std::fmt;

use crate::error::ValidationError;

/// Result code carried in every confirm, shared by ADP, MAC and coordinator.
///
/// Codes the host does not know are kept verbatim in [`Status::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Success,
    // Adaptation layer
    InvalidRequest,
    InvalidIpv6Frame,
    NoKey,
    BadCcmOutput,
    RouteError,
    BtTableFull,
    FrameNotBuffered,
    StartupFailure,
    NotPermitted,
    UnknownDevice,
    Timeout,
    AlreadyInProgress,
    // MAC layer
    CounterError,
    ImproperKeyType,
    ImproperSecurityLevel,
    UnsupportedLegacy,
    UnsupportedSecurity,
    ChannelAccessFailure,
    Denied,
    SecurityError,
    FrameTooLong,
    InvalidHandle,
    InvalidParameter,
    NoAck,
    NoBeacon,
    NoData,
    NoShortAddress,
    OutOfCap,
    TransactionExpired,
    TransactionOverflow,
    UnavailableKey,
    UnsupportedAttribute,
    InvalidAddress,
    InvalidIndex,
    LimitReached,
    ReadOnly,
    ScanInProgress,
    InternalError,
    Other(u8),
}

const CODES: &[(Status, u8)] = &[
    (Status::Success, 0x00),
    (Status::InvalidRequest, 0x80),
    (Status::InvalidIpv6Frame, 0x81),
    (Status::NoKey, 0x82),
    (Status::BadCcmOutput, 0x83),
    (Status::RouteError, 0x84),
    (Status::BtTableFull, 0x85),
    (Status::FrameNotBuffered, 0x86),
    (Status::StartupFailure, 0x87),
    (Status::NotPermitted, 0x88),
    (Status::UnknownDevice, 0x89),
    (Status::Timeout, 0x8A),
    (Status::AlreadyInProgress, 0x8B),
    (Status::CounterError, 0xDB),
    (Status::ImproperKeyType, 0xDC),
    (Status::ImproperSecurityLevel, 0xDD),
    (Status::UnsupportedLegacy, 0xDE),
    (Status::UnsupportedSecurity, 0xDF),
    (Status::ChannelAccessFailure, 0xE1),
    (Status::Denied, 0xE2),
    (Status::SecurityError, 0xE4),
    (Status::FrameTooLong, 0xE5),
    (Status::InvalidHandle, 0xE7),
    (Status::InvalidParameter, 0xE8),
    (Status::NoAck, 0xE9),
    (Status::NoBeacon, 0xEA),
    (Status::NoData, 0xEB),
    (Status::NoShortAddress, 0xEC),
    (Status::OutOfCap, 0xED),
    (Status::TransactionExpired, 0xF0),
    (Status::TransactionOverflow, 0xF1),
    (Status::UnavailableKey, 0xF3),
    (Status::UnsupportedAttribute, 0xF4),
    (Status::InvalidAddress, 0xF5),
    (Status::InvalidIndex, 0xF9),
    (Status::LimitReached, 0xFA),
    (Status::ReadOnly, 0xFB),
    (Status::ScanInProgress, 0xFC),
    (Status::InternalError, 0xFF),
];

impl Status {
    /// The raw status byte.
    pub fn code(self) -> u8 {
        if let Status::Other(code) = self {
            return code;
        }
        CODES
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, c)| *c)
            .unwrap_or(0xFF)
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Upper-snake name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::InvalidRequest => "INVALID_REQUEST",
            Status::InvalidIpv6Frame => "INVALID_IPV6_FRAME",
            Status::NoKey => "NO_KEY",
            Status::BadCcmOutput => "BAD_CCM_OUTPUT",
            Status::RouteError => "ROUTE_ERROR",
            Status::BtTableFull => "BT_TABLE_FULL",
            Status::FrameNotBuffered => "FRAME_NOT_BUFFERED",
            Status::StartupFailure => "STARTUP_FAILURE",
            Status::NotPermitted => "NOT_PERMITTED",
            Status::UnknownDevice => "UNKNOWN_DEVICE",
            Status::Timeout => "TIMEOUT",
            Status::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            Status::CounterError => "COUNTER_ERROR",
            Status::ImproperKeyType => "IMPROPER_KEY_TYPE",
            Status::ImproperSecurityLevel => "IMPROPER_SECURITY_LEVEL",
            Status::UnsupportedLegacy => "UNSUPPORTED_LEGACY",
            Status::UnsupportedSecurity => "UNSUPPORTED_SECURITY",
            Status::ChannelAccessFailure => "CHANNEL_ACCESS_FAILURE",
            Status::Denied => "DENIED",
            Status::SecurityError => "SECURITY_ERROR",
            Status::FrameTooLong => "FRAME_TOO_LONG",
            Status::InvalidHandle => "INVALID_HANDLE",
            Status::InvalidParameter => "INVALID_PARAMETER",
            Status::NoAck => "NO_ACK",
            Status::NoBeacon => "NO_BEACON",
            Status::NoData => "NO_DATA",
            Status::NoShortAddress => "NO_SHORT_ADDRESS",
            Status::OutOfCap => "OUT_OF_CAP",
            Status::TransactionExpired => "TRANSACTION_EXPIRED",
            Status::TransactionOverflow => "TRANSACTION_OVERFLOW",
            Status::UnavailableKey => "UNAVAILABLE_KEY",
            Status::UnsupportedAttribute => "UNSUPPORTED_ATTRIBUTE",
            Status::InvalidAddress => "INVALID_ADDRESS",
            Status::InvalidIndex => "INVALID_INDEX",
            Status::LimitReached => "LIMIT_REACHED",
            Status::ReadOnly => "READ_ONLY",
            Status::ScanInProgress => "SCAN_IN_PROGRESS",
            Status::InternalError => "INTERNAL_ERROR",
            Status::Other(_) => "OTHER",
        }
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(s, _)| *s)
            .unwrap_or(Status::Other(code))
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        status.code()
    }
}

/// Local refusals are reported to callers as an invalid-parameter result.
impl From<ValidationError> for Status {
    fn from(_: ValidationError) -> Self {
        Status::InvalidParameter
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Other(code) => write!(f, "STATUS_{code:#04x}"),
            s => f.write_str(s.name()),
        }
    }
}
