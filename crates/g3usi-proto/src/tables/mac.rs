//! MAC layer information base (MAC PIB).

use crate::attribute::{AttributeSpec, AttributeTable, Layout};
use crate::records::RecordKind;

/// Largest MAC attribute value.
pub const MAC_MAX_VALUE_LEN: usize = 144;

pub const ACK_WAIT_DURATION: u32 = 0x0000_0040;
pub const MAX_BE: u32 = 0x0000_0047;
pub const BSN: u32 = 0x0000_0049;
pub const DSN: u32 = 0x0000_004C;
pub const MAX_CSMA_BACKOFFS: u32 = 0x0000_004E;
pub const MIN_BE: u32 = 0x0000_004F;
pub const PAN_ID: u32 = 0x0000_0050;
pub const PROMISCUOUS_MODE: u32 = 0x0000_0051;
pub const SHORT_ADDRESS: u32 = 0x0000_0053;
pub const MAX_FRAME_RETRIES: u32 = 0x0000_0059;
pub const TIMESTAMP_SUPPORTED: u32 = 0x0000_005C;
pub const SECURITY_ENABLED: u32 = 0x0000_005D;
pub const KEY_TABLE: u32 = 0x0000_0071;
pub const FRAME_COUNTER: u32 = 0x0000_0077;
pub const HIGH_PRIORITY_WINDOW_SIZE: u32 = 0x0000_0100;
pub const TX_DATA_PACKET_COUNT: u32 = 0x0000_0101;
pub const RX_DATA_PACKET_COUNT: u32 = 0x0000_0102;
pub const TX_CMD_PACKET_COUNT: u32 = 0x0000_0103;
pub const RX_CMD_PACKET_COUNT: u32 = 0x0000_0104;
pub const CSMA_FAIL_COUNT: u32 = 0x0000_0105;
pub const CSMA_NO_ACK_COUNT: u32 = 0x0000_0106;
pub const RX_DATA_BROADCAST_COUNT: u32 = 0x0000_0107;
pub const TX_DATA_BROADCAST_COUNT: u32 = 0x0000_0108;
pub const BAD_CRC_COUNT: u32 = 0x0000_0109;
pub const NEIGHBOUR_TABLE: u32 = 0x0000_010A;
pub const FREQ_NOTCHING: u32 = 0x0000_010B;
pub const CSMA_FAIRNESS_LIMIT: u32 = 0x0000_010C;
pub const TMR_TTL: u32 = 0x0000_010D;
pub const POS_TABLE_ENTRY_TTL: u32 = 0x0000_010E;
pub const RC_COORD: u32 = 0x0000_010F;
pub const TONE_MASK: u32 = 0x0000_0110;
pub const BEACON_RANDOMIZATION_WINDOW_LENGTH: u32 = 0x0000_0111;
pub const A: u32 = 0x0000_0112;
pub const K: u32 = 0x0000_0113;
pub const MIN_CW_ATTEMPTS: u32 = 0x0000_0114;
pub const CENELEC_LEGACY_MODE: u32 = 0x0000_0115;
pub const FCC_LEGACY_MODE: u32 = 0x0000_0116;
pub const BROADCAST_MAX_CW_ENABLE: u32 = 0x0000_011E;
pub const TRANSMIT_ATTEN: u32 = 0x0000_011F;
pub const POS_TABLE: u32 = 0x0000_0120;
pub const POS_RECENT_ENTRY_THRESHOLD: u32 = 0x0000_0121;
pub const POS_RECENT_ENTRIES: u32 = 0x0000_0122;
pub const DUPLICATE_DETECTION_TTL: u32 = 0x0000_0123;
pub const RX_PACKET_COUNT: u32 = 0x0000_0126;

// Dual-media (RF) attributes.
pub const DSN_RF: u32 = 0x0000_0200;
pub const MAX_BE_RF: u32 = 0x0000_0201;
pub const MAX_CSMA_BACKOFFS_RF: u32 = 0x0000_0202;
pub const MAX_FRAME_RETRIES_RF: u32 = 0x0000_0203;
pub const MIN_BE_RF: u32 = 0x0000_0204;
pub const TIMESTAMP_SUPPORTED_RF: u32 = 0x0000_0205;
pub const DEVICE_TABLE_RF: u32 = 0x0000_0206;
pub const FRAME_COUNTER_RF: u32 = 0x0000_0207;
pub const DUPLICATE_DETECTION_TTL_RF: u32 = 0x0000_0208;
pub const COUNTER_OCTETS_RF: u32 = 0x0000_0209;
pub const RETRY_COUNT_RF: u32 = 0x0000_020A;
pub const MULTIPLE_RETRY_COUNT_RF: u32 = 0x0000_020B;
pub const TX_FAIL_COUNT_RF: u32 = 0x0000_020C;
pub const TX_SUCCESS_COUNT_RF: u32 = 0x0000_020D;

// Manufacturer attributes.
pub const MANUF_DEVICE_TABLE: u32 = 0x0800_0000;
pub const MANUF_NEIGHBOUR_TABLE_ELEMENT: u32 = 0x0800_0001;
pub const MANUF_BAND_INFORMATION: u32 = 0x0800_0002;
pub const MANUF_COORD_SHORT_ADDRESS: u32 = 0x0800_0003;
pub const MANUF_MAX_MAC_PAYLOAD_SIZE: u32 = 0x0800_0004;
pub const MANUF_NEIGHBOUR_TABLE_SIZE: u32 = 0x0800_0005;
pub const MANUF_POS_TABLE_ELEMENT: u32 = 0x0800_0006;
pub const MANUF_MAC_INTERNAL_VERSION: u32 = 0x0800_0007;
pub const MANUF_MAC_RT_INTERNAL_VERSION: u32 = 0x0800_0008;
pub const MANUF_RESET_MAC_STATS: u32 = 0x0800_0009;
pub const MANUF_DEBUG_SET: u32 = 0x0800_000A;
pub const MANUF_DEBUG_READ: u32 = 0x0800_000B;
pub const MANUF_POS_TABLE_SIZE: u32 = 0x0800_000C;
pub const MANUF_TRICKLE_MIN_LQI: u32 = 0x0800_000E;
pub const MANUF_NEIGHBOUR_LQI: u32 = 0x0800_000F;
pub const MANUF_BEST_LQI: u32 = 0x0800_0010;
pub const MANUF_EXTENDED_ADDRESS: u32 = 0x0800_0011;
pub const MANUF_RETRIES_LEFT_TO_FORCE_ROBO: u32 = 0x0800_0012;
pub const MANUF_SPEC_COMPLIANCE: u32 = 0x0800_0013;
pub const MANUF_SLEEP_MODE: u32 = 0x0800_0014;
pub const MANUF_MAC_RF_INTERNAL_VERSION: u32 = 0x0800_0200;

/// RF attributes have low 16 bits in `0x0200..=0x02FF`.
pub fn is_rf(id: u32) -> bool {
    (0x0200..=0x02FF).contains(&(id & 0xFFFF))
}

use Layout::{Blob, Bool, Bytes, Record, U16, U32, U8};

const ROWS: &[AttributeSpec] = &[
    AttributeSpec::ro(ACK_WAIT_DURATION, "ACK_WAIT_DURATION", U16),
    AttributeSpec::rw(MAX_BE, "MAX_BE", U8),
    AttributeSpec::rw(BSN, "BSN", U8),
    AttributeSpec::rw(DSN, "DSN", U8),
    AttributeSpec::rw(MAX_CSMA_BACKOFFS, "MAX_CSMA_BACKOFFS", U8),
    AttributeSpec::rw(MIN_BE, "MIN_BE", U8),
    AttributeSpec::rw(PAN_ID, "PAN_ID", U16),
    AttributeSpec::rw(PROMISCUOUS_MODE, "PROMISCUOUS_MODE", Bool),
    AttributeSpec::rw(SHORT_ADDRESS, "SHORT_ADDRESS", U16),
    AttributeSpec::rw(MAX_FRAME_RETRIES, "MAX_FRAME_RETRIES", U8),
    AttributeSpec::ro(TIMESTAMP_SUPPORTED, "TIMESTAMP_SUPPORTED", Bool),
    AttributeSpec::ro(SECURITY_ENABLED, "SECURITY_ENABLED", Bool),
    AttributeSpec::rw(KEY_TABLE, "KEY_TABLE", Bytes(16)),
    AttributeSpec::rw(FRAME_COUNTER, "FRAME_COUNTER", U32),
    AttributeSpec::rw(HIGH_PRIORITY_WINDOW_SIZE, "HIGH_PRIORITY_WINDOW_SIZE", U8),
    AttributeSpec::ro(TX_DATA_PACKET_COUNT, "TX_DATA_PACKET_COUNT", U32),
    AttributeSpec::ro(RX_DATA_PACKET_COUNT, "RX_DATA_PACKET_COUNT", U32),
    AttributeSpec::ro(TX_CMD_PACKET_COUNT, "TX_CMD_PACKET_COUNT", U32),
    AttributeSpec::ro(RX_CMD_PACKET_COUNT, "RX_CMD_PACKET_COUNT", U32),
    AttributeSpec::ro(CSMA_FAIL_COUNT, "CSMA_FAIL_COUNT", U32),
    AttributeSpec::ro(CSMA_NO_ACK_COUNT, "CSMA_NO_ACK_COUNT", U32),
    AttributeSpec::ro(RX_DATA_BROADCAST_COUNT, "RX_DATA_BROADCAST_COUNT", U32),
    AttributeSpec::ro(TX_DATA_BROADCAST_COUNT, "TX_DATA_BROADCAST_COUNT", U32),
    AttributeSpec::ro(BAD_CRC_COUNT, "BAD_CRC_COUNT", U32),
    AttributeSpec::ro(
        NEIGHBOUR_TABLE,
        "NEIGHBOUR_TABLE",
        Record(RecordKind::NeighbourEntry),
    ),
    AttributeSpec::rw(FREQ_NOTCHING, "FREQ_NOTCHING", Bool),
    AttributeSpec::rw(CSMA_FAIRNESS_LIMIT, "CSMA_FAIRNESS_LIMIT", U8),
    AttributeSpec::rw(TMR_TTL, "TMR_TTL", U8),
    AttributeSpec::rw(POS_TABLE_ENTRY_TTL, "POS_TABLE_ENTRY_TTL", U8),
    AttributeSpec::rw(RC_COORD, "RC_COORD", U16),
    AttributeSpec::rw(TONE_MASK, "TONE_MASK", Bytes(9)),
    AttributeSpec::rw(
        BEACON_RANDOMIZATION_WINDOW_LENGTH,
        "BEACON_RANDOMIZATION_WINDOW_LENGTH",
        U8,
    ),
    AttributeSpec::rw(A, "A", U8),
    AttributeSpec::rw(K, "K", U8),
    AttributeSpec::rw(MIN_CW_ATTEMPTS, "MIN_CW_ATTEMPTS", U8),
    AttributeSpec::ro(CENELEC_LEGACY_MODE, "CENELEC_LEGACY_MODE", U8),
    AttributeSpec::ro(FCC_LEGACY_MODE, "FCC_LEGACY_MODE", U8),
    AttributeSpec::rw(BROADCAST_MAX_CW_ENABLE, "BROADCAST_MAX_CW_ENABLE", Bool),
    AttributeSpec::rw(TRANSMIT_ATTEN, "TRANSMIT_ATTEN", U8),
    AttributeSpec::ro(POS_TABLE, "POS_TABLE", Record(RecordKind::PosEntry)),
    AttributeSpec::rw(POS_RECENT_ENTRY_THRESHOLD, "POS_RECENT_ENTRY_THRESHOLD", U16),
    AttributeSpec::ro(POS_RECENT_ENTRIES, "POS_RECENT_ENTRIES", U16),
    AttributeSpec::rw(DUPLICATE_DETECTION_TTL, "DUPLICATE_DETECTION_TTL", U8),
    AttributeSpec::ro(RX_PACKET_COUNT, "RX_PACKET_COUNT", U32),
    AttributeSpec::rw(DSN_RF, "DSN_RF", U8).rf(),
    AttributeSpec::rw(MAX_BE_RF, "MAX_BE_RF", U8).rf(),
    AttributeSpec::rw(MAX_CSMA_BACKOFFS_RF, "MAX_CSMA_BACKOFFS_RF", U8).rf(),
    AttributeSpec::rw(MAX_FRAME_RETRIES_RF, "MAX_FRAME_RETRIES_RF", U8).rf(),
    AttributeSpec::rw(MIN_BE_RF, "MIN_BE_RF", U8).rf(),
    AttributeSpec::ro(TIMESTAMP_SUPPORTED_RF, "TIMESTAMP_SUPPORTED_RF", Bool).rf(),
    AttributeSpec::ro(
        DEVICE_TABLE_RF,
        "DEVICE_TABLE_RF",
        Record(RecordKind::DeviceTableEntry),
    )
    .rf(),
    AttributeSpec::rw(FRAME_COUNTER_RF, "FRAME_COUNTER_RF", U32).rf(),
    AttributeSpec::rw(DUPLICATE_DETECTION_TTL_RF, "DUPLICATE_DETECTION_TTL_RF", U8).rf(),
    AttributeSpec::ro(COUNTER_OCTETS_RF, "COUNTER_OCTETS_RF", U8).rf(),
    AttributeSpec::ro(RETRY_COUNT_RF, "RETRY_COUNT_RF", U32).rf(),
    AttributeSpec::ro(MULTIPLE_RETRY_COUNT_RF, "MULTIPLE_RETRY_COUNT_RF", U32).rf(),
    AttributeSpec::ro(TX_FAIL_COUNT_RF, "TX_FAIL_COUNT_RF", U32).rf(),
    AttributeSpec::ro(TX_SUCCESS_COUNT_RF, "TX_SUCCESS_COUNT_RF", U32).rf(),
    AttributeSpec::ro(
        MANUF_DEVICE_TABLE,
        "MANUF_DEVICE_TABLE",
        Record(RecordKind::DeviceTableEntry),
    ),
    AttributeSpec::ro(
        MANUF_NEIGHBOUR_TABLE_ELEMENT,
        "MANUF_NEIGHBOUR_TABLE_ELEMENT",
        Record(RecordKind::NeighbourEntry),
    ),
    AttributeSpec::ro(
        MANUF_BAND_INFORMATION,
        "MANUF_BAND_INFORMATION",
        Record(RecordKind::BandInfo),
    ),
    AttributeSpec::rw(MANUF_COORD_SHORT_ADDRESS, "MANUF_COORD_SHORT_ADDRESS", U16),
    AttributeSpec::ro(MANUF_MAX_MAC_PAYLOAD_SIZE, "MANUF_MAX_MAC_PAYLOAD_SIZE", U16),
    AttributeSpec::ro(MANUF_NEIGHBOUR_TABLE_SIZE, "MANUF_NEIGHBOUR_TABLE_SIZE", U16),
    AttributeSpec::ro(
        MANUF_POS_TABLE_ELEMENT,
        "MANUF_POS_TABLE_ELEMENT",
        Record(RecordKind::PosEntry),
    ),
    AttributeSpec::ro(
        MANUF_MAC_INTERNAL_VERSION,
        "MANUF_MAC_INTERNAL_VERSION",
        Record(RecordKind::SoftVersion),
    ),
    AttributeSpec::ro(
        MANUF_MAC_RT_INTERNAL_VERSION,
        "MANUF_MAC_RT_INTERNAL_VERSION",
        Record(RecordKind::SoftVersion),
    ),
    AttributeSpec::rw(MANUF_RESET_MAC_STATS, "MANUF_RESET_MAC_STATS", Bool),
    AttributeSpec::rw(MANUF_DEBUG_SET, "MANUF_DEBUG_SET", Bytes(7)),
    AttributeSpec::ro(MANUF_DEBUG_READ, "MANUF_DEBUG_READ", Blob { max: 144 }),
    AttributeSpec::ro(MANUF_POS_TABLE_SIZE, "MANUF_POS_TABLE_SIZE", U16),
    AttributeSpec::rw(MANUF_TRICKLE_MIN_LQI, "MANUF_TRICKLE_MIN_LQI", U8),
    AttributeSpec::ro(MANUF_NEIGHBOUR_LQI, "MANUF_NEIGHBOUR_LQI", U8),
    AttributeSpec::ro(MANUF_BEST_LQI, "MANUF_BEST_LQI", U8),
    AttributeSpec::rw(MANUF_EXTENDED_ADDRESS, "MANUF_EXTENDED_ADDRESS", Bytes(8)),
    AttributeSpec::rw(
        MANUF_RETRIES_LEFT_TO_FORCE_ROBO,
        "MANUF_RETRIES_LEFT_TO_FORCE_ROBO",
        U8,
    ),
    AttributeSpec::rw(MANUF_SPEC_COMPLIANCE, "MANUF_SPEC_COMPLIANCE", U8),
    AttributeSpec::rw(MANUF_SLEEP_MODE, "MANUF_SLEEP_MODE", Bool),
    AttributeSpec::ro(
        MANUF_MAC_RF_INTERNAL_VERSION,
        "MANUF_MAC_RF_INTERNAL_VERSION",
        Record(RecordKind::SoftVersion),
    )
    .rf(),
];

/// The MAC PIB table.
pub static MAC_TABLE: AttributeTable =
    AttributeTable::new("mac", ROWS, MAC_MAX_VALUE_LEN, is_rf);
