//! Adaptation layer information base (ADP IB).

use crate::attribute::{AttributeSpec, AttributeTable, Layout};
use crate::records::RecordKind;

/// Largest ADP attribute value.
pub const ADP_MAX_VALUE_LEN: usize = 64;

pub const SECURITY_LEVEL: u32 = 0x0000_0000;
pub const PREFIX_TABLE: u32 = 0x0000_0001;
pub const BROADCAST_LOG_TABLE_ENTRY_TTL: u32 = 0x0000_0002;
pub const METRIC_TYPE: u32 = 0x0000_0003;
pub const LOW_LQI_VALUE: u32 = 0x0000_0004;
pub const HIGH_LQI_VALUE: u32 = 0x0000_0005;
pub const RREP_WAIT: u32 = 0x0000_0006;
pub const CONTEXT_INFORMATION_TABLE: u32 = 0x0000_0007;
pub const COORD_SHORT_ADDRESS: u32 = 0x0000_0008;
pub const RLC_ENABLED: u32 = 0x0000_0009;
pub const ADD_REV_LINK_COST: u32 = 0x0000_000A;
pub const BROADCAST_LOG_TABLE: u32 = 0x0000_000B;
pub const ROUTING_TABLE: u32 = 0x0000_000C;
pub const UNICAST_RREQ_GEN_ENABLE: u32 = 0x0000_000D;
pub const GROUP_TABLE: u32 = 0x0000_000E;
pub const MAX_HOPS: u32 = 0x0000_000F;
pub const DEVICE_TYPE: u32 = 0x0000_0010;
pub const NET_TRAVERSAL_TIME: u32 = 0x0000_0011;
pub const ROUTING_TABLE_ENTRY_TTL: u32 = 0x0000_0012;
pub const KR: u32 = 0x0000_0013;
pub const KM: u32 = 0x0000_0014;
pub const KC: u32 = 0x0000_0015;
pub const KQ: u32 = 0x0000_0016;
pub const KH: u32 = 0x0000_0017;
pub const RREQ_RETRIES: u32 = 0x0000_0018;
pub const RREQ_WAIT: u32 = 0x0000_0019;
pub const WEAK_LQI_VALUE: u32 = 0x0000_001A;
pub const KRT: u32 = 0x0000_001B;
pub const SOFT_VERSION: u32 = 0x0000_001C;
pub const SNIFFER_MODE: u32 = 0x0000_001D;
pub const BLACKLIST_TABLE: u32 = 0x0000_001E;
pub const BLACKLIST_TABLE_ENTRY_TTL: u32 = 0x0000_001F;
pub const MAX_JOIN_WAIT_TIME: u32 = 0x0000_0020;
pub const PATH_DISCOVERY_TIME: u32 = 0x0000_0021;
pub const ACTIVE_KEY_INDEX: u32 = 0x0000_0022;
pub const DESTINATION_ADDRESS_SET: u32 = 0x0000_0023;
pub const DEFAULT_COORD_ROUTE_ENABLED: u32 = 0x0000_0024;
pub const DELAY_LOW_LQI: u32 = 0x0000_0025;
pub const DELAY_HIGH_LQI: u32 = 0x0000_0026;
pub const RREQ_JITTER_LOW_LQI: u32 = 0x0000_0027;
pub const RREQ_JITTER_HIGH_LQI: u32 = 0x0000_0028;
pub const TRICKLE_DATA_ENABLED: u32 = 0x0000_0029;
pub const TRICKLE_LQI_THRESHOLD_LOW: u32 = 0x0000_002A;
pub const TRICKLE_LQI_THRESHOLD_HIGH: u32 = 0x0000_002B;
pub const TRICKLE_MAX_KI: u32 = 0x0000_002C;
pub const TRICKLE_ADAPTIVE_I: u32 = 0x0000_002D;
pub const TRICKLE_ADAPTIVE_KI: u32 = 0x0000_002E;
pub const TRICKLE_STEP: u32 = 0x0000_002F;
pub const TRICKLE_FACTOR_IMIN: u32 = 0x0000_0030;
pub const CLUSTER_TRICKLE_ENABLED: u32 = 0x0000_0031;
pub const CLUSTER_MIN_LQI: u32 = 0x0000_0032;
pub const CLUSTER_TRICKLE_K: u32 = 0x0000_0033;
pub const CLUSTER_TRICKLE_I: u32 = 0x0000_0034;
pub const CLUSTER_RREQ_ROUTE_COST_DEVIATION: u32 = 0x0000_0035;
pub const LAST_GASP: u32 = 0x0000_0036;

// Dual-media (RF) attributes.
pub const LOW_LQI_VALUE_RF: u32 = 0x0000_00D0;
pub const HIGH_LQI_VALUE_RF: u32 = 0x0000_00D1;
pub const KQ_RF: u32 = 0x0000_00D2;
pub const KH_RF: u32 = 0x0000_00D3;
pub const KRT_RF: u32 = 0x0000_00D4;
pub const KDC_RF: u32 = 0x0000_00D5;
pub const USE_BACKUP_MEDIA: u32 = 0x0000_00D6;
pub const WEAK_LQI_VALUE_RF: u32 = 0x0000_00D7;
pub const DISABLE_PHY: u32 = 0x0000_00D8;

// Manufacturer attributes.
pub const MANUF_REASSEMBLY_TIMER: u32 = 0x0800_0000;
pub const MANUF_IPV6_HEADER_COMPRESSION: u32 = 0x0800_0001;
pub const MANUF_EAP_PRESHARED_KEY: u32 = 0x0800_0002;
pub const MANUF_EAP_NETWORK_ACCESS_IDENTIFIER: u32 = 0x0800_0003;
pub const MANUF_BROADCAST_SEQUENCE_NUMBER: u32 = 0x0800_0004;
pub const MANUF_DATAGRAM_TAG: u32 = 0x0800_0006;
pub const MANUF_RANDP: u32 = 0x0800_0007;
pub const MANUF_ROUTING_TABLE_COUNT: u32 = 0x0800_0008;
pub const MANUF_DISCOVER_SEQUENCE_NUMBER: u32 = 0x0800_0009;
pub const MANUF_FORCED_NO_ACK_REQUEST: u32 = 0x0800_000A;
pub const MANUF_LQI_TO_COORD: u32 = 0x0800_000B;
pub const MANUF_BROADCAST_ROUTE_ALL: u32 = 0x0800_000C;
pub const MANUF_KEEP_PARAMS_AFTER_KICK_LEAVE: u32 = 0x0800_000D;
pub const MANUF_ADP_INTERNAL_VERSION: u32 = 0x0800_000E;
pub const MANUF_CIRCULAR_ROUTES_DETECTED: u32 = 0x0800_000F;
pub const MANUF_LAST_CIRCULAR_ROUTE_ADDRESS: u32 = 0x0800_0010;
pub const MANUF_IPV6_ULA_DEST_SHORT_ADDRESS: u32 = 0x0800_0011;
pub const MANUF_MAX_REPAIR_RESEND_ATTEMPTS: u32 = 0x0800_0012;
pub const MANUF_DISABLE_AUTO_RREQ: u32 = 0x0800_0013;
pub const MANUF_ALL_NEIGHBORS_BLACKLISTED_COUNT: u32 = 0x0800_0015;
pub const MANUF_QUEUED_ENTRIES_REMOVED_TIMEOUT_COUNT: u32 = 0x0800_0016;
pub const MANUF_QUEUED_ENTRIES_REMOVED_ROUTE_ERROR_COUNT: u32 = 0x0800_0017;
pub const MANUF_PENDING_DATA_IND_SHORT_ADDRESS: u32 = 0x0800_0018;
pub const MANUF_GET_BAND_CONTEXT_TONES: u32 = 0x0800_0019;
pub const MANUF_UPDATE_NON_VOLATILE_DATA: u32 = 0x0800_001A;
pub const MANUF_DISCOVER_ROUTE_GLOBAL_SEQ_NUM: u32 = 0x0800_001B;
pub const MANUF_FRAGMENT_DELAY: u32 = 0x0800_001C;
pub const MANUF_DYNAMIC_FRAGMENT_DELAY_ENABLED: u32 = 0x0800_001D;
pub const MANUF_DYNAMIC_FRAGMENT_DELAY_FACTOR: u32 = 0x0800_001E;
pub const MANUF_BLACKLIST_TABLE_COUNT: u32 = 0x0800_001F;
pub const MANUF_BROADCAST_LOG_TABLE_COUNT: u32 = 0x0800_0020;
pub const MANUF_CONTEXT_INFORMATION_TABLE_COUNT: u32 = 0x0800_0021;
pub const MANUF_GROUP_TABLE_COUNT: u32 = 0x0800_0022;
pub const MANUF_ROUTING_TABLE_ELEMENT: u32 = 0x0800_0023;
pub const MANUF_SET_PHASEDIFF_PREQ_PREP: u32 = 0x0800_0024;

/// RF attributes occupy `0xD0..=0xDF`.
pub fn is_rf(id: u32) -> bool {
    (0xD0..=0xDF).contains(&id)
}

use Layout::{Blob, Bool, Bytes, Record, U16, U32, U8};

const ROWS: &[AttributeSpec] = &[
    AttributeSpec::rw(SECURITY_LEVEL, "SECURITY_LEVEL", U8),
    AttributeSpec::rw(PREFIX_TABLE, "PREFIX_TABLE", Record(RecordKind::PrefixEntry)),
    AttributeSpec::rw(BROADCAST_LOG_TABLE_ENTRY_TTL, "BROADCAST_LOG_TABLE_ENTRY_TTL", U16),
    AttributeSpec::rw(METRIC_TYPE, "METRIC_TYPE", U8),
    AttributeSpec::rw(LOW_LQI_VALUE, "LOW_LQI_VALUE", U8),
    AttributeSpec::rw(HIGH_LQI_VALUE, "HIGH_LQI_VALUE", U8),
    AttributeSpec::rw(RREP_WAIT, "RREP_WAIT", U8),
    AttributeSpec::rw(
        CONTEXT_INFORMATION_TABLE,
        "CONTEXT_INFORMATION_TABLE",
        Record(RecordKind::ContextEntry),
    ),
    AttributeSpec::rw(COORD_SHORT_ADDRESS, "COORD_SHORT_ADDRESS", U16),
    AttributeSpec::rw(RLC_ENABLED, "RLC_ENABLED", Bool),
    AttributeSpec::rw(ADD_REV_LINK_COST, "ADD_REV_LINK_COST", U8),
    AttributeSpec::ro(
        BROADCAST_LOG_TABLE,
        "BROADCAST_LOG_TABLE",
        Record(RecordKind::BroadcastLogEntry),
    ),
    AttributeSpec::rw(ROUTING_TABLE, "ROUTING_TABLE", Record(RecordKind::RoutingEntry)),
    AttributeSpec::rw(UNICAST_RREQ_GEN_ENABLE, "UNICAST_RREQ_GEN_ENABLE", Bool),
    AttributeSpec::rw(GROUP_TABLE, "GROUP_TABLE", U16),
    AttributeSpec::rw(MAX_HOPS, "MAX_HOPS", U8),
    AttributeSpec::rw(DEVICE_TYPE, "DEVICE_TYPE", U8),
    AttributeSpec::rw(NET_TRAVERSAL_TIME, "NET_TRAVERSAL_TIME", U8),
    AttributeSpec::rw(ROUTING_TABLE_ENTRY_TTL, "ROUTING_TABLE_ENTRY_TTL", U16),
    AttributeSpec::rw(KR, "KR", U8),
    AttributeSpec::rw(KM, "KM", U8),
    AttributeSpec::rw(KC, "KC", U8),
    AttributeSpec::rw(KQ, "KQ", U8),
    AttributeSpec::rw(KH, "KH", U8),
    AttributeSpec::rw(RREQ_RETRIES, "RREQ_RETRIES", U8),
    AttributeSpec::rw(RREQ_WAIT, "RREQ_WAIT", U8),
    AttributeSpec::rw(WEAK_LQI_VALUE, "WEAK_LQI_VALUE", U8),
    AttributeSpec::rw(KRT, "KRT", U8),
    AttributeSpec::ro(SOFT_VERSION, "SOFT_VERSION", Record(RecordKind::SoftVersion)),
    AttributeSpec::rw(SNIFFER_MODE, "SNIFFER_MODE", Bool),
    AttributeSpec::rw(BLACKLIST_TABLE, "BLACKLIST_TABLE", Record(RecordKind::BlacklistEntry)),
    AttributeSpec::rw(BLACKLIST_TABLE_ENTRY_TTL, "BLACKLIST_TABLE_ENTRY_TTL", U16),
    AttributeSpec::rw(MAX_JOIN_WAIT_TIME, "MAX_JOIN_WAIT_TIME", U16),
    AttributeSpec::rw(PATH_DISCOVERY_TIME, "PATH_DISCOVERY_TIME", U8),
    AttributeSpec::rw(ACTIVE_KEY_INDEX, "ACTIVE_KEY_INDEX", U8),
    AttributeSpec::rw(DESTINATION_ADDRESS_SET, "DESTINATION_ADDRESS_SET", U16),
    AttributeSpec::rw(DEFAULT_COORD_ROUTE_ENABLED, "DEFAULT_COORD_ROUTE_ENABLED", Bool),
    AttributeSpec::rw(DELAY_LOW_LQI, "DELAY_LOW_LQI", U16),
    AttributeSpec::rw(DELAY_HIGH_LQI, "DELAY_HIGH_LQI", U16),
    AttributeSpec::rw(RREQ_JITTER_LOW_LQI, "RREQ_JITTER_LOW_LQI", U8),
    AttributeSpec::rw(RREQ_JITTER_HIGH_LQI, "RREQ_JITTER_HIGH_LQI", U8),
    AttributeSpec::rw(TRICKLE_DATA_ENABLED, "TRICKLE_DATA_ENABLED", Bool),
    AttributeSpec::rw(TRICKLE_LQI_THRESHOLD_LOW, "TRICKLE_LQI_THRESHOLD_LOW", U8),
    AttributeSpec::rw(TRICKLE_LQI_THRESHOLD_HIGH, "TRICKLE_LQI_THRESHOLD_HIGH", U8),
    AttributeSpec::rw(TRICKLE_MAX_KI, "TRICKLE_MAX_KI", U8),
    AttributeSpec::rw(TRICKLE_ADAPTIVE_I, "TRICKLE_ADAPTIVE_I", Bool),
    AttributeSpec::rw(TRICKLE_ADAPTIVE_KI, "TRICKLE_ADAPTIVE_KI", U8),
    AttributeSpec::rw(TRICKLE_STEP, "TRICKLE_STEP", U8),
    AttributeSpec::rw(TRICKLE_FACTOR_IMIN, "TRICKLE_FACTOR_IMIN", U8),
    AttributeSpec::rw(CLUSTER_TRICKLE_ENABLED, "CLUSTER_TRICKLE_ENABLED", Bool),
    AttributeSpec::rw(CLUSTER_MIN_LQI, "CLUSTER_MIN_LQI", U8),
    AttributeSpec::rw(CLUSTER_TRICKLE_K, "CLUSTER_TRICKLE_K", U8),
    AttributeSpec::rw(CLUSTER_TRICKLE_I, "CLUSTER_TRICKLE_I", U16),
    AttributeSpec::rw(
        CLUSTER_RREQ_ROUTE_COST_DEVIATION,
        "CLUSTER_RREQ_ROUTE_COST_DEVIATION",
        U8,
    ),
    AttributeSpec::rw(LAST_GASP, "LAST_GASP", Bool),
    AttributeSpec::rw(LOW_LQI_VALUE_RF, "LOW_LQI_VALUE_RF", U8).rf(),
    AttributeSpec::rw(HIGH_LQI_VALUE_RF, "HIGH_LQI_VALUE_RF", U8).rf(),
    AttributeSpec::rw(KQ_RF, "KQ_RF", U8).rf(),
    AttributeSpec::rw(KH_RF, "KH_RF", U8).rf(),
    AttributeSpec::rw(KRT_RF, "KRT_RF", U8).rf(),
    AttributeSpec::rw(KDC_RF, "KDC_RF", U8).rf(),
    AttributeSpec::rw(USE_BACKUP_MEDIA, "USE_BACKUP_MEDIA", Bool).rf(),
    AttributeSpec::rw(WEAK_LQI_VALUE_RF, "WEAK_LQI_VALUE_RF", U8).rf(),
    AttributeSpec::rw(DISABLE_PHY, "DISABLE_PHY", Bool).rf(),
    AttributeSpec::rw(MANUF_REASSEMBLY_TIMER, "MANUF_REASSEMBLY_TIMER", U16),
    AttributeSpec::rw(MANUF_IPV6_HEADER_COMPRESSION, "MANUF_IPV6_HEADER_COMPRESSION", Bool),
    AttributeSpec::rw(MANUF_EAP_PRESHARED_KEY, "MANUF_EAP_PRESHARED_KEY", Bytes(16)),
    AttributeSpec::rw(
        MANUF_EAP_NETWORK_ACCESS_IDENTIFIER,
        "MANUF_EAP_NETWORK_ACCESS_IDENTIFIER",
        Blob { max: 36 },
    ),
    AttributeSpec::rw(MANUF_BROADCAST_SEQUENCE_NUMBER, "MANUF_BROADCAST_SEQUENCE_NUMBER", U8),
    AttributeSpec::rw(MANUF_DATAGRAM_TAG, "MANUF_DATAGRAM_TAG", U16),
    AttributeSpec::rw(MANUF_RANDP, "MANUF_RANDP", Bytes(16)),
    AttributeSpec::ro(MANUF_ROUTING_TABLE_COUNT, "MANUF_ROUTING_TABLE_COUNT", U32),
    AttributeSpec::rw(MANUF_DISCOVER_SEQUENCE_NUMBER, "MANUF_DISCOVER_SEQUENCE_NUMBER", U16),
    AttributeSpec::rw(MANUF_FORCED_NO_ACK_REQUEST, "MANUF_FORCED_NO_ACK_REQUEST", Bool),
    AttributeSpec::ro(MANUF_LQI_TO_COORD, "MANUF_LQI_TO_COORD", U8),
    AttributeSpec::rw(MANUF_BROADCAST_ROUTE_ALL, "MANUF_BROADCAST_ROUTE_ALL", Bool),
    AttributeSpec::rw(
        MANUF_KEEP_PARAMS_AFTER_KICK_LEAVE,
        "MANUF_KEEP_PARAMS_AFTER_KICK_LEAVE",
        Bool,
    ),
    AttributeSpec::ro(
        MANUF_ADP_INTERNAL_VERSION,
        "MANUF_ADP_INTERNAL_VERSION",
        Record(RecordKind::SoftVersion),
    ),
    AttributeSpec::ro(MANUF_CIRCULAR_ROUTES_DETECTED, "MANUF_CIRCULAR_ROUTES_DETECTED", U16),
    AttributeSpec::ro(
        MANUF_LAST_CIRCULAR_ROUTE_ADDRESS,
        "MANUF_LAST_CIRCULAR_ROUTE_ADDRESS",
        U16,
    ),
    AttributeSpec::rw(
        MANUF_IPV6_ULA_DEST_SHORT_ADDRESS,
        "MANUF_IPV6_ULA_DEST_SHORT_ADDRESS",
        U16,
    ),
    AttributeSpec::rw(
        MANUF_MAX_REPAIR_RESEND_ATTEMPTS,
        "MANUF_MAX_REPAIR_RESEND_ATTEMPTS",
        U8,
    ),
    AttributeSpec::rw(MANUF_DISABLE_AUTO_RREQ, "MANUF_DISABLE_AUTO_RREQ", Bool),
    AttributeSpec::ro(
        MANUF_ALL_NEIGHBORS_BLACKLISTED_COUNT,
        "MANUF_ALL_NEIGHBORS_BLACKLISTED_COUNT",
        U16,
    ),
    AttributeSpec::ro(
        MANUF_QUEUED_ENTRIES_REMOVED_TIMEOUT_COUNT,
        "MANUF_QUEUED_ENTRIES_REMOVED_TIMEOUT_COUNT",
        U16,
    ),
    AttributeSpec::ro(
        MANUF_QUEUED_ENTRIES_REMOVED_ROUTE_ERROR_COUNT,
        "MANUF_QUEUED_ENTRIES_REMOVED_ROUTE_ERROR_COUNT",
        U16,
    ),
    AttributeSpec::ro(
        MANUF_PENDING_DATA_IND_SHORT_ADDRESS,
        "MANUF_PENDING_DATA_IND_SHORT_ADDRESS",
        U16,
    ),
    AttributeSpec::ro(MANUF_GET_BAND_CONTEXT_TONES, "MANUF_GET_BAND_CONTEXT_TONES", U8),
    AttributeSpec::rw(MANUF_UPDATE_NON_VOLATILE_DATA, "MANUF_UPDATE_NON_VOLATILE_DATA", Bool),
    AttributeSpec::rw(
        MANUF_DISCOVER_ROUTE_GLOBAL_SEQ_NUM,
        "MANUF_DISCOVER_ROUTE_GLOBAL_SEQ_NUM",
        U16,
    ),
    AttributeSpec::rw(MANUF_FRAGMENT_DELAY, "MANUF_FRAGMENT_DELAY", U16),
    AttributeSpec::rw(
        MANUF_DYNAMIC_FRAGMENT_DELAY_ENABLED,
        "MANUF_DYNAMIC_FRAGMENT_DELAY_ENABLED",
        Bool,
    ),
    AttributeSpec::rw(
        MANUF_DYNAMIC_FRAGMENT_DELAY_FACTOR,
        "MANUF_DYNAMIC_FRAGMENT_DELAY_FACTOR",
        U16,
    ),
    AttributeSpec::ro(MANUF_BLACKLIST_TABLE_COUNT, "MANUF_BLACKLIST_TABLE_COUNT", U16),
    AttributeSpec::ro(MANUF_BROADCAST_LOG_TABLE_COUNT, "MANUF_BROADCAST_LOG_TABLE_COUNT", U16),
    AttributeSpec::ro(
        MANUF_CONTEXT_INFORMATION_TABLE_COUNT,
        "MANUF_CONTEXT_INFORMATION_TABLE_COUNT",
        U16,
    ),
    AttributeSpec::ro(MANUF_GROUP_TABLE_COUNT, "MANUF_GROUP_TABLE_COUNT", U16),
    AttributeSpec::ro(
        MANUF_ROUTING_TABLE_ELEMENT,
        "MANUF_ROUTING_TABLE_ELEMENT",
        Record(RecordKind::RoutingEntry),
    ),
    AttributeSpec::rw(MANUF_SET_PHASEDIFF_PREQ_PREP, "MANUF_SET_PHASEDIFF_PREQ_PREP", Bool),
];

/// The ADP IB table.
pub static ADP_TABLE: AttributeTable =
    AttributeTable::new("adp", ROWS, ADP_MAX_VALUE_LEN, is_rf);
