//! Static attribute tables, one per control sub-protocol.

pub mod adp;
pub mod coord;
pub mod mac;

pub use adp::ADP_TABLE;
pub use coord::COORD_TABLE;
pub use mac::MAC_TABLE;

use crate::attribute::AttributeTable;

/// Table by short name (`adp`, `mac`, `coord`).
pub fn by_name(name: &str) -> Option<&'static AttributeTable> {
    match name.to_ascii_lowercase().as_str() {
        "adp" => Some(&ADP_TABLE),
        "mac" => Some(&MAC_TABLE),
        "coord" | "coordinator" => Some(&COORD_TABLE),
        _ => None,
    }
}
