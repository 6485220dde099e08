//! Network coordinator (bootstrap server) parameters.

use crate::attribute::{AttributeSpec, AttributeTable, Layout};

/// Largest coordinator parameter value.
pub const COORD_MAX_VALUE_LEN: usize = 64;

pub const GMK: u32 = 0x0000_0000;
pub const REKEY_GMK: u32 = 0x0000_0001;
pub const IDS: u32 = 0x0000_0002;
pub const PSK: u32 = 0x0000_0003;
pub const MSG_TIMEOUT: u32 = 0x0000_0004;
pub const ACTIVE_KEY_INDEX: u32 = 0x0000_0005;
pub const INITIAL_SHORT_ADDRESS: u32 = 0x0000_0006;
pub const JOINED_DEVICES: u32 = 0x0000_0007;
pub const MAX_HOPS: u32 = 0x0000_0008;
pub const REKEY_INTERVAL: u32 = 0x0000_0009;

/// The coordinator has no RF-specific parameters.
pub fn is_rf(_id: u32) -> bool {
    false
}

use Layout::{Blob, Bytes, U16, U32, U8};

const ROWS: &[AttributeSpec] = &[
    AttributeSpec::rw(GMK, "GMK", Bytes(16)),
    AttributeSpec::rw(REKEY_GMK, "REKEY_GMK", Bytes(16)),
    AttributeSpec::rw(IDS, "IDS", Blob { max: 34 }),
    AttributeSpec::rw(PSK, "PSK", Bytes(16)),
    AttributeSpec::rw(MSG_TIMEOUT, "MSG_TIMEOUT", U16),
    AttributeSpec::rw(ACTIVE_KEY_INDEX, "ACTIVE_KEY_INDEX", U8),
    AttributeSpec::rw(INITIAL_SHORT_ADDRESS, "INITIAL_SHORT_ADDRESS", U16),
    AttributeSpec::ro(JOINED_DEVICES, "JOINED_DEVICES", U16),
    AttributeSpec::rw(MAX_HOPS, "MAX_HOPS", U8),
    AttributeSpec::rw(REKEY_INTERVAL, "REKEY_INTERVAL", U32),
];

/// The coordinator parameter table.
pub static COORD_TABLE: AttributeTable =
    AttributeTable::new("coord", ROWS, COORD_MAX_VALUE_LEN, is_rf);
