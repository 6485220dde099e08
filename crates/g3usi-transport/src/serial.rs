use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::UsiStream;

/// TTY binding for a directly attached modem.
pub struct SerialLink;

impl SerialLink {
    /// Open a TTY device in 8N1 mode with no flow control.
    pub fn open(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<UsiStream> {
        if path.is_empty() {
            return Err(TransportError::InvalidEndpoint(path.to_string()));
        }

        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()
            .map_err(|e| TransportError::Open {
                path: path.to_string(),
                baud_rate,
                source: e.into(),
            })?;

        // Stale bytes from a previous session would only cost a resync.
        if let Err(e) = port.clear(serialport::ClearBuffer::All) {
            debug!(path, error = %e, "could not clear serial buffers (continuing)");
        }

        info!(path, baud_rate, "opened serial link");
        Ok(UsiStream::from_serial(port))
    }

    /// List serial devices visible to the host, sorted by name.
    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.port_name)
            .collect();
        names.sort();
        names
    }
}
