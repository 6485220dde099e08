//! Byte-level links to a G3-PLC modem.
//!
//! Provides a unified stream over the two ways a modem is reachable:
//! - A TTY device (8 data bits, no parity, 1 stop bit)
//! - A TCP socket to a serial-over-IP bridge
//!
//! This is the lowest layer of g3usi. Framing and everything above it only
//! see the [`UsiStream`] type provided here.

pub mod endpoint;
pub mod error;
pub mod serial;
pub mod tcp;
pub mod traits;

pub use endpoint::{open, Endpoint, TransportConfig, DEFAULT_BAUD_RATE, DEFAULT_TCP_PORT};
pub use error::{Result, TransportError};
pub use serial::SerialLink;
pub use tcp::TcpLink;
pub use traits::UsiStream;
