//! Sub-protocol discriminators carried in the USI header.
//!
//! The discriminator is 6 bits wide, so valid ids are `0x00..=0x3F`.

/// Device management protocol (parameter queries, node enumeration).
pub const MNGP: u8 = 0x00;

/// Diagnostic sniffer feed.
pub const SNIFFER: u8 = 0x14;

/// PHY serial interface (extended length).
pub const PHY_SERIAL: u8 = 0x1F;

/// MAC layer control.
pub const MAC: u8 = 0x21;

/// Adaptation layer (ADP) control.
pub const ADP: u8 = 0x22;

/// Network coordinator bootstrap control.
pub const COORD: u8 = 0x23;

/// PRIME API (extended length).
pub const PRIME_API: u8 = 0x30;

/// Largest value a 6-bit discriminator can hold.
pub const MAX_PROTOCOL: u8 = 0x3F;

/// Returns a human-readable name for a discriminator.
pub fn protocol_name(id: u8) -> &'static str {
    match id {
        MNGP => "MNGP",
        SNIFFER => "SNIFFER",
        PHY_SERIAL => "PHY_SERIAL",
        MAC => "MAC",
        ADP => "ADP",
        COORD => "COORD",
        PRIME_API => "PRIME_API",
        0x01..=MAX_PROTOCOL => "UNKNOWN",
        _ => "INVALID",
    }
}

/// Returns true if frames of this protocol carry length bit 10 in the command byte.
pub fn uses_extended_length(id: u8) -> bool {
    matches!(id, PRIME_API | PHY_SERIAL)
}

/// Returns true if `id` fits in the 6-bit discriminator field.
pub fn is_valid(id: u8) -> bool {
    id <= MAX_PROTOCOL
}

/// Parse a protocol name (case-insensitive) or a numeric id.
pub fn parse_protocol(s: &str) -> Option<u8> {
    let id = match s.to_ascii_uppercase().as_str() {
        "MNGP" => MNGP,
        "SNIFFER" => SNIFFER,
        "PHY_SERIAL" | "PHY" => PHY_SERIAL,
        "MAC" => MAC,
        "ADP" => ADP,
        "COORD" | "COORDINATOR" => COORD,
        "PRIME_API" | "PRIME" => PRIME_API,
        other => match other.strip_prefix("0X") {
            Some(hex) => u8::from_str_radix(hex, 16).ok()?,
            None => other.parse().ok()?,
        },
    };
    is_valid(id).then_some(id)
}
