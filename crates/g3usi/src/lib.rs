//! Host-side bridge to G3-PLC power-line modems.
//!
//! A modem speaks USI: byte-stuffed, CRC-protected frames carrying several
//! control sub-protocols (device management, adaptation layer, MAC, network
//! coordinator) and a sniffer feed, over a serial line or a TCP bridge.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial and TCP links
//! - [`frame`]: USI framing, reassembly and protocol ids
//! - [`proto`]: message catalogs and the attribute codec tables
//! - [`host`]: per-connection context with callbacks and synchronous calls (behind `host` feature)

/// Re-export transport types.
pub mod transport {
    pub use g3usi_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use g3usi_frame::*;
}

/// Re-export message catalog types.
pub mod proto {
    pub use g3usi_proto::*;
}

/// Re-export host types (requires `host` feature).
#[cfg(feature = "host")]
pub mod host {
    pub use g3usi_host::*;
}
